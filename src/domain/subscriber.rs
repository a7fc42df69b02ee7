//! src/domain/subscriber.rs

use crate::domain::{SubscriberEmail, SubscriberToken};
use chrono::{DateTime, Utc};

/// A recipient of the digest.
///
/// Records are never deleted: unsubscribing clears `active`, subscribing
/// again sets it back and keeps the original token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub email: SubscriberEmail,
    pub unsubscribe_token: SubscriberToken,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl Subscriber {
    /// Self-service removal link embedded in every digest.
    pub fn unsubscribe_link(&self, base_url: &str) -> String {
        format!(
            "{}/unsubscribe?token={}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(self.unsubscribe_token.as_ref())
        )
    }
}
