//! src/storage/mod.rs
//!
//! Durable subscriber records. [`SubscriberStore`] is the seam between the
//! front ends and the database; [`connect`] picks the backend once, from the
//! scheme of the configured connection string.

mod postgres;
mod sqlite;
mod subscriptions;

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;
pub use subscriptions::Subscriptions;

use crate::configuration::DatabaseSettings;
use crate::domain::{Subscriber, SubscriberEmail, SubscriberToken};
use crate::error::error_chain_fmt;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use std::sync::Arc;

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Insert `email` with a fresh token, or reactivate the existing record.
    async fn subscribe(&self, email: &SubscriberEmail) -> Result<Subscriber, StorageError>;

    /// Deactivate the subscriber owning `token` and return the updated record.
    /// Returns `None` if no active subscriber owns it.
    async fn unsubscribe(
        &self,
        token: &SubscriberToken,
    ) -> Result<Option<Subscriber>, StorageError>;

    /// Deactivate the subscriber with address `email`.
    /// Returns false if no active subscriber has it.
    async fn unsubscribe_email(&self, email: &SubscriberEmail) -> Result<bool, StorageError>;

    async fn find_by_token(
        &self,
        token: &SubscriberToken,
    ) -> Result<Option<Subscriber>, StorageError>;

    async fn list_active(&self) -> Result<Vec<Subscriber>, StorageError>;

    /// Number of active subscribers.
    async fn count(&self) -> Result<i64, StorageError>;
}

#[derive(thiserror::Error)]
pub enum StorageError {
    #[error("Failed to execute a query against the subscriber database")]
    Database(#[from] sqlx::Error),
    #[error("Failed to migrate the subscriber database")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Generated unsubscribe token collides with an existing subscriber")]
    TokenCollision,
    #[error("Stored subscriber record is invalid: {0}")]
    Corrupted(String),
    #[error("Unsupported database url `{0}`, expected postgres:// or sqlite:")]
    UnsupportedBackend(String),
}

impl std::fmt::Debug for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl StorageError {
    /// Unique violations on the token column must never be retried as an
    /// update, so they get their own variant.
    fn from_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // postgres names the constraint, sqlite names the column
            if db_err.is_unique_violation() && db_err.message().contains("unsubscribe_token") {
                return StorageError::TokenCollision;
            }
        }
        StorageError::Database(err)
    }
}

/// Row of the `subscribers` table, shared by both backends.
#[derive(sqlx::FromRow)]
struct SubscriberRecord {
    email: String,
    unsubscribe_token: String,
    active: bool,
    created_at: DateTime<Utc>,
    unsubscribed_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubscriberRecord> for Subscriber {
    type Error = StorageError;

    fn try_from(record: SubscriberRecord) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(record.email)
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;
        let unsubscribe_token = SubscriberToken::parse(record.unsubscribe_token)
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;
        Ok(Subscriber {
            email,
            unsubscribe_token,
            active: record.active,
            created_at: record.created_at,
            unsubscribed_at: record.unsubscribed_at,
        })
    }
}

fn into_subscribers(records: Vec<SubscriberRecord>) -> Result<Vec<Subscriber>, StorageError> {
    records.into_iter().map(Subscriber::try_from).collect()
}

/// Connect to the configured database, run the embedded migrations and
/// return the matching backend.
#[tracing::instrument(name = "Connect to the subscriber database", skip_all)]
pub async fn connect(
    configuration: &DatabaseSettings,
) -> Result<Arc<dyn SubscriberStore>, StorageError> {
    let url = configuration.url.expose_secret();
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        tracing::info!("Using PostgreSQL subscriber store");
        let store = PostgresStore::connect(url, configuration.max_connections).await?;
        Ok(Arc::new(store))
    } else if url.starts_with("sqlite:") {
        tracing::info!("Using SQLite subscriber store");
        let store = SqliteStore::connect(url, configuration.max_connections).await?;
        Ok(Arc::new(store))
    } else {
        let scheme = url.split(':').next().unwrap_or_default().to_owned();
        Err(StorageError::UnsupportedBackend(scheme))
    }
}
