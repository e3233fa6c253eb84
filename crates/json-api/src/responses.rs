//! Shared response bodies.

use salvo::{
    http::{StatusCode, header::LOCATION},
    oapi::ToSchema,
    prelude::Response,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::ApiError;

/// Acknowledgement for operations that return no resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct AckResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AckResponse {
    pub(crate) const fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub(crate) fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Mark `res` as `201 Created` with a `Location` pointing at the new resource.
pub(crate) fn created_at(res: &mut Response, location: &str) -> Result<(), ApiError> {
    res.add_header(LOCATION, location, true).map_err(|source| {
        error!(location, "failed to set location header: {source}");

        ApiError::internal()
    })?;

    res.status_code(StatusCode::CREATED);

    Ok(())
}
