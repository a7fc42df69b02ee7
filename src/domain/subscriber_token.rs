//! src/domain/subscriber_token.rs

use crate::domain::ValidationError;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

const TOKEN_LENGTH: usize = 32;

/// Secret token that lets a subscriber unsubscribe without logging in.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubscriberToken {
    token: String,
}

impl AsRef<str> for SubscriberToken {
    fn as_ref(&self) -> &str {
        &self.token
    }
}

impl SubscriberToken {
    /// Generate a random 32-characters-long case-sensitive unsubscribe token.
    /// `thread_rng` is a CSPRNG, which keeps collisions out of reach.
    pub fn generate() -> Self {
        let mut rng = thread_rng();
        Self {
            token: std::iter::repeat_with(|| rng.sample(Alphanumeric))
                .map(char::from)
                .take(TOKEN_LENGTH)
                .collect(),
        }
    }
    /// check if any char of token is not alphanumeric
    pub fn is_valid(&self) -> Result<&str, ValidationError> {
        if self.token.chars().any(|c| !c.is_ascii_alphanumeric())
            || self.token.chars().count() != TOKEN_LENGTH
        {
            Err(ValidationError::InvalidToken(self.token.to_owned()))
        } else {
            Ok(&self.token)
        }
    }
    /// parse string as token
    pub fn parse(s: String) -> Result<SubscriberToken, ValidationError> {
        let token = Self { token: s };
        token.is_valid()?;
        Ok(token)
    }
}
