//! main.rs

use agent_news::cli::{Cli, Command};
use agent_news::configuration::get_configuration;
use agent_news::error::AppResult;
use agent_news::telemetry::{get_subscriber, init_subscriber};
use clap::Parser;

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    // keep stdout clean for the output of the one-shot commands
    if cli.command == Command::Serve {
        init_subscriber(get_subscriber(
            "agent_news".into(),
            "info".into(),
            std::io::stdout,
        ));
    } else {
        init_subscriber(get_subscriber(
            "agent_news".into(),
            "info".into(),
            std::io::stderr,
        ));
    }

    // Panic if we can't read configuration
    let configuration = get_configuration().expect("Failed to read configuration.");
    if let Err(e) = cli.run(configuration).await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "agent_news failed"
        );
        return Err(e);
    }
    Ok(())
}
