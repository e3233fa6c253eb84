//! Promotions service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{domain::promotions::capacity::CapacityConflict, media::MediaStorageError};

/// A submitted campaign value is out of range.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum PromotionValidationError {
    #[error("minutesPerHour must be between 1 and 60, got {0}")]
    MinutesPerHour(u8),

    #[error("overlayOpacity must be between 0 and 1, got {0}")]
    OverlayOpacity(f64),

    #[error("name cannot be blank")]
    BlankName,
}

#[derive(Debug, Error)]
pub enum PromotionsServiceError {
    #[error("promotion not found")]
    NotFound,

    #[error("invalid promotion: {0}")]
    Invalid(#[from] PromotionValidationError),

    #[error("requested minutes exceed hourly capacity")]
    CapacityExceeded(Vec<CapacityConflict>),

    #[error("invalid data")]
    InvalidData,

    #[error("media storage error")]
    Media(#[source] MediaStorageError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<MediaStorageError> for PromotionsServiceError {
    fn from(error: MediaStorageError) -> Self {
        Self::Media(error)
    }
}

impl From<PromotionsRepositoryError> for PromotionsServiceError {
    fn from(error: PromotionsRepositoryError) -> Self {
        match error {
            PromotionsRepositoryError::NotFound => Self::NotFound,
            PromotionsRepositoryError::CapacityExceeded(conflicts) => {
                Self::CapacityExceeded(conflicts)
            }
            PromotionsRepositoryError::InvalidData => Self::InvalidData,
            PromotionsRepositoryError::Sql(source) => Self::Sql(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum PromotionsRepositoryError {
    #[error("promotion not found")]
    NotFound,

    #[error("requested minutes exceed hourly capacity")]
    CapacityExceeded(Vec<CapacityConflict>),

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PromotionsRepositoryError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
