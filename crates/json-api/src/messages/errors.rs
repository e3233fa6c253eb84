//! Message Errors

use tracing::error;

use umutoza_app::domain::messages::MessagesServiceError;

use crate::errors::ApiError;

pub(crate) fn into_api_error(error: MessagesServiceError) -> ApiError {
    match error {
        MessagesServiceError::NotFound => ApiError::not_found("Message not found"),
        MessagesServiceError::Invalid(source) => ApiError::validation(source.to_string()),
        MessagesServiceError::Sql(source) => {
            error!("message storage error: {source}");

            ApiError::internal()
        }
    }
}
