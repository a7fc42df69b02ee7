//! src/storage/sqlite.rs

use super::{into_subscribers, StorageError, SubscriberRecord, SubscriberStore};
use crate::domain::{Subscriber, SubscriberEmail, SubscriberToken};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// How long a writer waits for another process holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Subscriber store for local development, backed by a single SQLite file.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        let pool_options = if is_in_memory(url) {
            // every connection to `:memory:` opens its own empty database,
            // so the pool must keep exactly one connection alive
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            // the web front end and the send job write to the same file
            options = options.journal_mode(SqliteJournalMode::Wal);
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let pool = pool_options.connect_with(options).await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
        Ok(Self { pool })
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[async_trait]
impl SubscriberStore for SqliteStore {
    #[tracing::instrument(
        name = "Subscribe in sqlite store",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn subscribe(&self, email: &SubscriberEmail) -> Result<Subscriber, StorageError> {
        let token = SubscriberToken::generate();
        // the conflict branch leaves the token alone, so reactivation keeps it
        let record = sqlx::query_as::<_, SubscriberRecord>(
            r#"
            INSERT INTO subscribers (email, unsubscribe_token, active, created_at)
            VALUES (?1, ?2, TRUE, ?3)
            ON CONFLICT (email) DO UPDATE SET active = TRUE, unsubscribed_at = NULL
            RETURNING email, unsubscribe_token, active, created_at, unsubscribed_at
            "#,
        )
        .bind(email.as_ref())
        .bind(token.as_ref())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::from_insert)?;
        record.try_into()
    }

    #[tracing::instrument(name = "Unsubscribe by token in sqlite store", skip_all)]
    async fn unsubscribe(
        &self,
        token: &SubscriberToken,
    ) -> Result<Option<Subscriber>, StorageError> {
        let record = sqlx::query_as::<_, SubscriberRecord>(
            r#"
            UPDATE subscribers
            SET active = FALSE, unsubscribed_at = ?2
            WHERE unsubscribe_token = ?1 AND active = TRUE
            RETURNING email, unsubscribe_token, active, created_at, unsubscribed_at
            "#,
        )
        .bind(token.as_ref())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        record.map(Subscriber::try_from).transpose()
    }

    #[tracing::instrument(
        name = "Unsubscribe by email in sqlite store",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn unsubscribe_email(&self, email: &SubscriberEmail) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE subscribers
            SET active = FALSE, unsubscribed_at = ?2
            WHERE email = ?1 AND active = TRUE
            "#,
        )
        .bind(email.as_ref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(name = "Find subscriber by token in sqlite store", skip_all)]
    async fn find_by_token(
        &self,
        token: &SubscriberToken,
    ) -> Result<Option<Subscriber>, StorageError> {
        let record = sqlx::query_as::<_, SubscriberRecord>(
            r#"
            SELECT email, unsubscribe_token, active, created_at, unsubscribed_at
            FROM subscribers
            WHERE unsubscribe_token = ?1
            "#,
        )
        .bind(token.as_ref())
        .fetch_optional(&self.pool)
        .await?;
        record.map(Subscriber::try_from).transpose()
    }

    #[tracing::instrument(name = "List active subscribers in sqlite store", skip_all)]
    async fn list_active(&self) -> Result<Vec<Subscriber>, StorageError> {
        let records = sqlx::query_as::<_, SubscriberRecord>(
            r#"
            SELECT email, unsubscribe_token, active, created_at, unsubscribed_at
            FROM subscribers
            WHERE active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        into_subscribers(records)
    }

    #[tracing::instrument(name = "Count active subscribers in sqlite store", skip_all)]
    async fn count(&self) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscribers WHERE active = TRUE")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
