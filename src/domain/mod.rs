//! src/domain/mod.rs

mod article;
mod subscriber;
mod subscriber_email;
mod subscriber_token;

pub use article::Article;
pub use subscriber::Subscriber;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_token::SubscriberToken;

/// Validation error for domain data
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`{0}` is not a valid subscriber email.")]
    InvalidEmail(String),
    #[error("`{0}` is not a valid unsubscribe token.")]
    InvalidToken(String),
}
