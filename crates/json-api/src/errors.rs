//! JSON error responses.
//!
//! Every failed request renders an [`ErrorBody`]: a stable machine-readable
//! `error` code and a human-readable `message`, plus per-hour `conflicts` for
//! capacity refusals and `existingId` for duplicate questions.

use salvo::{
    Scribe,
    http::StatusCode,
    oapi::{self, Components, Content, EndpointOutRegister, Operation, ToSchema},
    prelude::{Json, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tracing::error;

use umutoza_app::{domain::promotions::capacity::CapacityConflict, media::MediaStorageError};

use crate::observability::record_api_error;

/// Error payload returned with every 4xx/5xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    /// Machine-readable error code
    pub error: String,

    /// Human-readable description
    pub message: String,

    /// Hours that cannot fit a campaign's requested minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<CapacityConflictBody>>,

    /// Identifier of the record a duplicate collides with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<Uuid>,
}

/// One full hour reported by a capacity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CapacityConflictBody {
    /// Hour of day, `0..=23`
    pub hour: u8,

    /// Minutes still free in that hour
    pub available: i32,

    /// Minutes the campaign asked for
    pub requested: u8,

    /// Minutes by which the request overflows the hour
    pub overage: u32,
}

impl From<CapacityConflict> for CapacityConflictBody {
    fn from(conflict: CapacityConflict) -> Self {
        Self {
            hour: conflict.hour,
            available: conflict.available,
            requested: conflict.requested,
            overage: conflict.overage,
        }
    }
}

/// An HTTP status paired with its JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.to_owned(),
                message: message.into(),
                conflicts: None,
                existing_id: None,
            },
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    pub(crate) fn unsupported_media(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_media", message)
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub(crate) fn conflict(error: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, error, message)
    }

    /// Internal failures never carry their cause; log it before calling this.
    pub(crate) fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
        )
    }

    #[must_use]
    pub(crate) fn with_conflicts(mut self, conflicts: Vec<CapacityConflict>) -> Self {
        self.body.conflicts = Some(conflicts.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub(crate) fn with_existing_id(mut self, existing: Option<Uuid>) -> Self {
        self.body.existing_id = existing;
        self
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.body.error, self.body.message)
    }
}

/// Client-fixable upload problems become 400s; filesystem failures are 500s.
pub(crate) fn media_error(error: MediaStorageError) -> ApiError {
    if error.is_rejection() {
        return ApiError::unsupported_media(error.to_string());
    }

    error!("media storage error: {error}");

    ApiError::internal()
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        record_api_error(&self.body.error);

        res.status_code(self.status);
        res.render(Json(self.body));
    }
}

impl EndpointOutRegister for ApiError {
    fn register(components: &mut Components, operation: &mut Operation) {
        let schema = ErrorBody::to_schema(components);

        for (status, description) in [
            (StatusCode::BAD_REQUEST, "Invalid request"),
            (StatusCode::UNAUTHORIZED, "Missing or invalid admin token"),
            (StatusCode::NOT_FOUND, "Record not found"),
            (StatusCode::CONFLICT, "Conflicts with existing data"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        ] {
            operation.responses.insert(
                status.as_str(),
                oapi::Response::new(description)
                    .add_content("application/json", Content::new(schema.clone())),
            );
        }
    }
}
