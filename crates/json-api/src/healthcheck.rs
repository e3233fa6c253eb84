//! Liveness probe

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

/// Health Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct HealthResponse {
    pub status: String,

    /// Server build version
    pub version: String,
}

/// Health Check
///
/// Answers as long as the process can serve requests; storage is not probed.
#[endpoint(tags("health"), summary = "Health Check")]
pub(crate) async fn handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}
