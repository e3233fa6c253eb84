//! Auth service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::auth::PasswordError;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("admin session not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("admin already exists")]
    AlreadyExists,

    #[error("username and password are required")]
    MissingCredentials,

    #[error("session expiry is out of range")]
    ExpiryOutOfRange,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("password hashing error")]
    Password(#[from] PasswordError),
}

impl From<AuthRepositoryError> for AuthServiceError {
    fn from(error: AuthRepositoryError) -> Self {
        match error {
            AuthRepositoryError::AlreadyExists => Self::AlreadyExists,
            AuthRepositoryError::Sql(source) => Self::Sql(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthRepositoryError {
    #[error("admin already exists")]
    AlreadyExists,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AuthRepositoryError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            _ => Self::Sql(error),
        }
    }
}
