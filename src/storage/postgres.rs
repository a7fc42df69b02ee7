//! src/storage/postgres.rs

use super::{into_subscribers, StorageError, SubscriberRecord, SubscriberStore};
use crate::domain::{Subscriber, SubscriberEmail, SubscriberToken};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Subscriber store for the cloud deployment.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(2))
            .connect(url)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self, StorageError> {
        sqlx::migrate!("./migrations/postgres").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SubscriberStore for PostgresStore {
    #[tracing::instrument(
        name = "Subscribe in postgres store",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn subscribe(&self, email: &SubscriberEmail) -> Result<Subscriber, StorageError> {
        let token = SubscriberToken::generate();
        // the conflict branch leaves the token alone, so reactivation keeps it
        let record = sqlx::query_as::<_, SubscriberRecord>(
            r#"
            INSERT INTO subscribers (email, unsubscribe_token, active, created_at)
            VALUES ($1, $2, TRUE, $3)
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

    #[tracing::instrument(name = "Unsubscribe by token in postgres store", skip_all)]
    async fn unsubscribe(
        &self,
        token: &SubscriberToken,
    ) -> Result<Option<Subscriber>, StorageError> {
        let record = sqlx::query_as::<_, SubscriberRecord>(
            r#"
            UPDATE subscribers
            SET active = FALSE, unsubscribed_at = $2
            WHERE unsubscribe_token = $1 AND active = TRUE
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
        name = "Unsubscribe by email in postgres store",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn unsubscribe_email(&self, email: &SubscriberEmail) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE subscribers
            SET active = FALSE, unsubscribed_at = $2
            WHERE email = $1 AND active = TRUE
            "#,
        )
        .bind(email.as_ref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(name = "Find subscriber by token in postgres store", skip_all)]
    async fn find_by_token(
        &self,
        token: &SubscriberToken,
    ) -> Result<Option<Subscriber>, StorageError> {
        let record = sqlx::query_as::<_, SubscriberRecord>(
            r#"
            SELECT email, unsubscribe_token, active, created_at, unsubscribed_at
            FROM subscribers
            WHERE unsubscribe_token = $1
            "#,
        )
        .bind(token.as_ref())
        .fetch_optional(&self.pool)
        .await?;
        record.map(Subscriber::try_from).transpose()
    }

    #[tracing::instrument(name = "List active subscribers in postgres store", skip_all)]
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

    #[tracing::instrument(name = "Count active subscribers in postgres store", skip_all)]
    async fn count(&self) -> Result<i64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscribers WHERE active = TRUE")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
