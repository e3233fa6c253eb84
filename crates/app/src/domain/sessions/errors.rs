//! Sessions service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::media::MediaStorageError;

#[derive(Debug, Error)]
pub enum SessionsServiceError {
    #[error("session not found")]
    NotFound,

    #[error("name is required")]
    InvalidName,

    #[error("progress must be between 0 and 100, got {0}")]
    InvalidProgress(u8),

    #[error("name is already taken")]
    NameTaken,

    #[error("invalid data")]
    InvalidData,

    #[error("avatar storage error")]
    Media(#[source] MediaStorageError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<MediaStorageError> for SessionsServiceError {
    fn from(error: MediaStorageError) -> Self {
        Self::Media(error)
    }
}

impl From<SessionsRepositoryError> for SessionsServiceError {
    fn from(error: SessionsRepositoryError) -> Self {
        match error {
            SessionsRepositoryError::NotFound => Self::NotFound,
            SessionsRepositoryError::NameTaken => Self::NameTaken,
            SessionsRepositoryError::InvalidData => Self::InvalidData,
            SessionsRepositoryError::Sql(source) => Self::Sql(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionsRepositoryError {
    #[error("session not found")]
    NotFound,

    #[error("name is already taken")]
    NameTaken,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for SessionsRepositoryError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::NameTaken,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
