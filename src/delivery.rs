//! src/delivery.rs

use crate::configuration::Settings;
use crate::digest::Digest;
use crate::email_client::Mailer;
use crate::error::{error_chain_fmt, AppResult};
use crate::news_source::NewsScraper;
use crate::storage::{self, Subscriptions};
use chrono::Utc;
use tracing::{field::display, Span};
use uuid::Uuid;

#[derive(thiserror::Error)]
pub enum DeliveryError {
    #[error("The mail server is not reachable")]
    MailerUnreachable(#[source] anyhow::Error),
}

impl std::fmt::Debug for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    NoArticles,
    NoSubscribers,
    Delivered(DeliveryReport),
}

/// Scrape the news site and put this week's issue together.
pub async fn compose_digest(configuration: &Settings) -> AppResult<Digest> {
    let scraper = NewsScraper::new(&configuration.digest)?;
    let articles = scraper.fetch_articles().await?;
    Ok(Digest::new(
        &configuration.digest.subject,
        articles,
        Utc::now().date_naive(),
    ))
}

/// One complete send job: scrape, connect, deliver.
#[tracing::instrument(
    name = "Run digest job",
    skip_all,
    fields(digest_run_id = %Uuid::new_v4())
)]
pub async fn run_digest_job(configuration: &Settings) -> AppResult<DeliveryOutcome> {
    let digest = compose_digest(configuration).await?;
    if digest.is_empty() {
        tracing::warn!("No articles found, skipping this issue");
        return Ok(DeliveryOutcome::NoArticles);
    }
    let subscriptions = Subscriptions::new(storage::connect(&configuration.database).await?);
    let email_client = configuration.emailclient.client()?;
    send_digest(
        &subscriptions,
        &email_client,
        &digest,
        &configuration.application.base_url,
    )
    .await
}

/// Send `digest` to every active subscriber.
///
/// A failed recipient is logged and counted, the batch carries on.
#[tracing::instrument(
    skip_all,
    fields(
        articles = digest.articles().len(),
        subscriber_email = tracing::field::Empty
    )
)]
pub async fn send_digest(
    subscriptions: &Subscriptions,
    mailer: &dyn Mailer,
    digest: &Digest,
    base_url: &str,
) -> AppResult<DeliveryOutcome> {
    if digest.is_empty() {
        tracing::warn!("No articles found, nothing to send");
        return Ok(DeliveryOutcome::NoArticles);
    }
    let subscribers = subscriptions.list_active().await?;
    if subscribers.is_empty() {
        tracing::warn!("No active subscribers found");
        return Ok(DeliveryOutcome::NoSubscribers);
    }
    match mailer.test_connection().await {
        Ok(true) => {}
        Ok(false) => Err(DeliveryError::MailerUnreachable(anyhow::anyhow!(
            "Mail server refused the connection test"
        )))?,
        Err(e) => Err(DeliveryError::MailerUnreachable(e))?,
    }

    let mut report = DeliveryReport {
        delivered: 0,
        failed: 0,
    };
    for subscriber in subscribers {
        Span::current().record("subscriber_email", &display(&subscriber.email));
        let email = match digest.render(&subscriber, base_url) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to render the digest for a subscriber. Skipping.",
                );
                report.failed += 1;
                continue;
            }
        };
        match mailer
            .send_email(
                &subscriber.email,
                &email.subject,
                &email.html_body,
                &email.text_body,
            )
            .await
        {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Failed to deliver the digest to an active subscriber. Skipping.",
                );
                report.failed += 1;
            }
        }
    }
    tracing::info!(
        delivered = report.delivered,
        failed = report.failed,
        "Digest delivery finished"
    );
    Ok(DeliveryOutcome::Delivered(report))
}
