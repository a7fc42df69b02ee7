//! src/error.rs

use crate::delivery::DeliveryError;
use crate::domain::ValidationError;
use crate::storage::StorageError;
use actix_web::http::StatusCode;
use actix_web::ResponseError;

pub type AppResult<T> = Result<T, Error>;

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

#[derive(thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    ValidationError(#[from] ValidationError),
    #[error("Subscriber storage failed")]
    StorageError(#[from] StorageError),
    #[error("Digest delivery failed")]
    DeliveryError(#[from] DeliveryError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::ValidationError(_) => StatusCode::BAD_REQUEST,
            Error::StorageError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::DeliveryError(_) | Error::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl Error {
    /// Message shown to a visitor of the web form.
    /// Only validation errors are worth repeating verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Error::ValidationError(e) => e.to_string(),
            _ => "Service temporarily unavailable. Please try again later.".to_owned(),
        }
    }
}
