//! Question Errors

use tracing::error;

use umutoza_app::domain::questions::QuestionsServiceError;

use crate::errors::{ApiError, media_error};

pub(crate) fn into_api_error(error: QuestionsServiceError) -> ApiError {
    match error {
        QuestionsServiceError::NotFound => ApiError::not_found("Question not found"),
        QuestionsServiceError::Invalid(source) => ApiError::validation(source.to_string()),
        QuestionsServiceError::Duplicate { existing } => {
            ApiError::conflict("duplicate_question", "An identical question already exists")
                .with_existing_id(existing.map(Into::into))
        }
        QuestionsServiceError::InvalidData => ApiError::validation("Invalid question payload"),
        QuestionsServiceError::Media(source) => media_error(source),
        QuestionsServiceError::Sql(source) => {
            error!("question storage error: {source}");

            ApiError::internal()
        }
    }
}
