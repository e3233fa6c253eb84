//! Questions service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{domain::questions::records::QuestionUuid, media::MediaStorageError};

/// A submitted question is malformed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum QuestionValidationError {
    #[error("question text is required")]
    BlankText,

    #[error("at least 2 options are required, got {0}")]
    TooFewOptions(usize),

    #[error("option {0} is blank")]
    BlankOption(usize),

    #[error("correct answer index {0} does not match an option")]
    AnswerOutOfRange(i64),
}

#[derive(Debug, Error)]
pub enum QuestionsServiceError {
    #[error("question not found")]
    NotFound,

    #[error("invalid question: {0}")]
    Invalid(#[from] QuestionValidationError),

    #[error("an identical question already exists")]
    Duplicate { existing: Option<QuestionUuid> },

    #[error("invalid data")]
    InvalidData,

    #[error("image storage error")]
    Media(#[source] MediaStorageError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<MediaStorageError> for QuestionsServiceError {
    fn from(error: MediaStorageError) -> Self {
        Self::Media(error)
    }
}

impl From<QuestionsRepositoryError> for QuestionsServiceError {
    fn from(error: QuestionsRepositoryError) -> Self {
        match error {
            QuestionsRepositoryError::NotFound => Self::NotFound,
            QuestionsRepositoryError::Duplicate => Self::Duplicate { existing: None },
            QuestionsRepositoryError::InvalidData => Self::InvalidData,
            QuestionsRepositoryError::Sql(source) => Self::Sql(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum QuestionsRepositoryError {
    #[error("question not found")]
    NotFound,

    #[error("an identical question already exists")]
    Duplicate,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for QuestionsRepositoryError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::Duplicate,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
