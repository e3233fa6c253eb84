//! Messages service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MessageValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum MessagesServiceError {
    #[error("message not found")]
    NotFound,

    #[error("invalid message: {0}")]
    Invalid(#[from] MessageValidationError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for MessagesServiceError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            error => Self::Sql(error),
        }
    }
}
