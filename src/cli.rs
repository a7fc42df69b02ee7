//! src/cli.rs

use crate::configuration::Settings;
use crate::delivery::{compose_digest, run_digest_job, DeliveryOutcome};
use crate::error::AppResult;
use crate::startup::Application;
use crate::storage::{self, Subscriptions};
use clap::{Args, Parser, Subcommand};

/// Weekly digest of AI agent news, sent to a list of email subscribers.
#[derive(Parser, Debug)]
#[command(name = "agent_news", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the subscribe / unsubscribe web front end
    Serve,
    /// Scrape the latest articles and mail them to every active subscriber
    SendDigest {
        /// Print the digest instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Add an address, or reactivate it if it unsubscribed before
    Subscribe {
        email: String,
    },
    /// Deactivate a subscriber by address or by unsubscribe token
    Unsubscribe(UnsubscribeArgs),
    /// Print all active subscribers
    List,
    /// Print the number of active subscribers
    Count,
}

#[derive(Args, Debug, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct UnsubscribeArgs {
    email: Option<String>,
    /// Token from the unsubscribe link of a digest
    #[arg(long)]
    token: Option<String>,
}

impl Cli {
    pub async fn run(self, configuration: Settings) -> AppResult<()> {
        match self.command {
            Command::Serve => {
                let application = Application::build(configuration).await?;
                tracing::info!("Listening on port {}", application.port());
                application
                    .run_until_stopped()
                    .await
                    .map_err(anyhow::Error::from)?;
            }
            Command::SendDigest { dry_run: true } => {
                let digest = compose_digest(&configuration).await?;
                if digest.is_empty() {
                    println!("No articles found.");
                    return Ok(());
                }
                let preview = digest
                    .render_preview(&configuration.application.base_url)
                    .map_err(anyhow::Error::from)?;
                println!("Subject: {}\n\n{}", preview.subject, preview.text_body);
            }
            Command::SendDigest { dry_run: false } => {
                match run_digest_job(&configuration).await? {
                    DeliveryOutcome::NoArticles => println!("No articles found, nothing sent."),
                    DeliveryOutcome::NoSubscribers => println!("No active subscribers."),
                    DeliveryOutcome::Delivered(report) => println!(
                        "Digest sent to {} subscribers ({} failed).",
                        report.delivered, report.failed
                    ),
                }
            }
            Command::Subscribe { email } => {
                let subscriber = subscriptions(&configuration).await?.subscribe(email).await?;
                println!(
                    "Subscribed {} (unsubscribe token: {})",
                    subscriber.email,
                    subscriber.unsubscribe_token.as_ref()
                );
            }
            Command::Unsubscribe(UnsubscribeArgs { email, token }) => {
                let subscriptions = subscriptions(&configuration).await?;
                let removed = match (email, token) {
                    (_, Some(token)) => subscriptions.unsubscribe(token).await?,
                    (Some(email), None) => subscriptions.unsubscribe_email(email).await?,
                    (None, None) => false,
                };
                if removed {
                    println!("Unsubscribed.");
                } else {
                    println!("No active subscriber matched, nothing changed.");
                }
            }
            Command::List => {
                let subscribers = subscriptions(&configuration).await?.list_active().await?;
                for subscriber in &subscribers {
                    println!(
                        "{}\t{}",
                        subscriber.email,
                        subscriber.created_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
                println!("{} active subscribers", subscribers.len());
            }
            Command::Count => {
                println!("{}", subscriptions(&configuration).await?.count().await?);
            }
        }
        Ok(())
    }
}

async fn subscriptions(configuration: &Settings) -> AppResult<Subscriptions> {
    Ok(Subscriptions::new(
        storage::connect(&configuration.database).await?,
    ))
}
