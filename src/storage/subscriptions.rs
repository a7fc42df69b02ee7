//! src/storage/subscriptions.rs

use super::SubscriberStore;
use crate::domain::{Subscriber, SubscriberEmail, SubscriberToken};
use crate::error::AppResult;
use std::sync::Arc;

/// Entry point of the web and CLI front ends.
///
/// Takes raw user input, validates it into domain types and forwards to
/// whichever [`SubscriberStore`] was selected at startup.
#[derive(Clone)]
pub struct Subscriptions {
    store: Arc<dyn SubscriberStore>,
}

impl Subscriptions {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(name = "Subscribe", skip(self))]
    pub async fn subscribe(&self, email: String) -> AppResult<Subscriber> {
        let email = SubscriberEmail::parse(email)?;
        let subscriber = self.store.subscribe(&email).await?;
        tracing::info!(subscriber_email = %subscriber.email, "Subscriber is active");
        Ok(subscriber)
    }

    /// A malformed token cannot belong to anyone, so it is a no-op
    /// rather than a validation error.
    pub async fn unsubscribe(&self, token: String) -> AppResult<bool> {
        Ok(self.deactivate(token).await?.is_some())
    }

    /// Like [`Subscriptions::unsubscribe`], but hands back the record that
    /// was deactivated.
    #[tracing::instrument(name = "Unsubscribe by token", skip_all)]
    pub async fn deactivate(&self, token: String) -> AppResult<Option<Subscriber>> {
        let token = match SubscriberToken::parse(token) {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(error.message = %e, "Ignoring malformed unsubscribe token");
                return Ok(None);
            }
        };
        Ok(self.store.unsubscribe(&token).await?)
    }

    #[tracing::instrument(name = "Unsubscribe by email", skip(self))]
    pub async fn unsubscribe_email(&self, email: String) -> AppResult<bool> {
        let email = SubscriberEmail::parse(email)?;
        Ok(self.store.unsubscribe_email(&email).await?)
    }

    #[tracing::instrument(name = "Find subscriber by token", skip_all)]
    pub async fn find_by_token(&self, token: String) -> AppResult<Option<Subscriber>> {
        match SubscriberToken::parse(token) {
            Ok(token) => Ok(self.store.find_by_token(&token).await?),
            Err(_) => Ok(None),
        }
    }

    pub async fn list_active(&self) -> AppResult<Vec<Subscriber>> {
        Ok(self.store.list_active().await?)
    }

    pub async fn count(&self) -> AppResult<i64> {
        Ok(self.store.count().await?)
    }
}
