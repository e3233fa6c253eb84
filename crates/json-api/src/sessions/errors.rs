//! Session Errors

use tracing::error;

use umutoza_app::domain::sessions::SessionsServiceError;

use crate::errors::{ApiError, media_error};

pub(crate) fn into_api_error(error: SessionsServiceError) -> ApiError {
    match error {
        SessionsServiceError::NotFound => ApiError::not_found("Session not found"),
        SessionsServiceError::InvalidName => ApiError::validation("Izina rirakenewe"),
        SessionsServiceError::InvalidProgress(progress) => ApiError::validation(format!(
            "progress must be between 0 and 100, got {progress}"
        )),
        SessionsServiceError::NameTaken => ApiError::conflict(
            "name_taken",
            "Iri zina ryamaze gukoreshwa nundi muntu. Hitamo irindi.",
        ),
        SessionsServiceError::InvalidData => ApiError::validation("Invalid session payload"),
        SessionsServiceError::Media(source) => media_error(source),
        SessionsServiceError::Sql(source) => {
            error!("session storage error: {source}");

            ApiError::internal()
        }
    }
}
