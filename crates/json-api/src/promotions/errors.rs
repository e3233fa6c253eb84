//! Promotion Errors

use tracing::error;

use umutoza_app::domain::promotions::{PromotionsServiceError, capacity::describe_conflicts};

use crate::errors::{ApiError, media_error};

pub(crate) fn into_api_error(error: PromotionsServiceError) -> ApiError {
    match error {
        PromotionsServiceError::NotFound => ApiError::not_found("Promotion not found"),
        PromotionsServiceError::Invalid(source) => ApiError::validation(source.to_string()),
        PromotionsServiceError::CapacityExceeded(conflicts) => {
            ApiError::conflict("capacity_exceeded", describe_conflicts(&conflicts))
                .with_conflicts(conflicts)
        }
        PromotionsServiceError::InvalidData => ApiError::validation("Invalid promotion payload"),
        PromotionsServiceError::Media(source) => media_error(source),
        PromotionsServiceError::Sql(source) => {
            error!("promotion storage error: {source}");

            ApiError::internal()
        }
    }
}
