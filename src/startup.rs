//! src/startup.rs

use crate::configuration::Settings;
use crate::error::AppResult;
use crate::routes::{health_check, home, subscribe, unsubscribe, unsubscribe_form};
use crate::storage::{self, Subscriptions};
use actix_web::cookie::Key;
use actix_web::{dev::Server, web, web::Data, App, HttpServer};
use actix_web_flash_messages::{storage::CookieMessageStore, FlashMessagesFramework};
use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/// Minimum length of the secret signing the flash message cookie.
const MIN_HMAC_SECRET_BYTES: usize = 64;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Connect to the configured store and bind the listener.
    pub async fn build(configuration: Settings) -> AppResult<Self> {
        let store = storage::connect(&configuration.database).await?;
        Self::build_with_subscriptions(configuration, Subscriptions::new(store))
    }

    /// Bind the listener around an already connected store.
    pub fn build_with_subscriptions(
        configuration: Settings,
        subscriptions: Subscriptions,
    ) -> AppResult<Self> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener
            .local_addr()
            .context("Failed to read the bound address")?
            .port();
        let server = run(
            listener,
            subscriptions,
            configuration.application.hmac_secret,
        )?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// A more expressive name that makes it clear that
    /// this function only returns when the application is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    subscriptions: Subscriptions,
    hmac_secret: Secret<String>,
) -> AppResult<Server> {
    let secret = hmac_secret.expose_secret().as_bytes();
    if secret.len() < MIN_HMAC_SECRET_BYTES {
        return Err(anyhow::anyhow!(
            "application.hmac_secret must be at least {} bytes long",
            MIN_HMAC_SECRET_BYTES
        )
        .into());
    }
    let message_store = CookieMessageStore::builder(Key::from(secret)).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let subscriptions = Data::new(subscriptions);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(TracingLogger::default())
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .route("/subscriptions", web::post().to(subscribe))
            .route("/unsubscribe", web::get().to(unsubscribe_form))
            .route("/unsubscribe", web::post().to(unsubscribe))
            .app_data(subscriptions.clone())
    })
    .listen(listener)
    .context("Failed to listen on the bound address")?
    .run();
    Ok(server)
}
