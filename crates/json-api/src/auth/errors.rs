//! Auth Errors

use tracing::error;

use umutoza_app::auth::AuthServiceError;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: AuthServiceError) -> ApiError {
    match error {
        AuthServiceError::MissingCredentials => {
            ApiError::validation("Username and password are required")
        }
        AuthServiceError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
        AuthServiceError::NotFound => ApiError::unauthorized("Invalid token"),
        AuthServiceError::AlreadyExists => ApiError::conflict("admin_exists", "Admin already exists"),
        AuthServiceError::ExpiryOutOfRange => {
            error!("admin session expiry is out of range");

            ApiError::internal()
        }
        AuthServiceError::Sql(source) => {
            error!("admin auth storage error: {source}");

            ApiError::internal()
        }
        AuthServiceError::Password(source) => {
            error!("failed to check admin password: {source}");

            ApiError::internal()
        }
    }
}
