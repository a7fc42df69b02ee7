//! src/domain/subscriber_email.rs

use crate::domain::ValidationError;
use validator::ValidateEmail;

/// Case-normalized email address of a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Trims and lower-cases `s`, then checks the result is a valid address.
    /// The error keeps the raw input so it can be shown back to the user.
    pub fn parse(s: String) -> Result<SubscriberEmail, ValidationError> {
        let normalized = s.trim().to_lowercase();
        if normalized.validate_email() {
            Ok(Self(normalized))
        } else {
            Err(ValidationError::InvalidEmail(s))
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
