//! Admin Login Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{auth::errors::into_api_error, errors::ApiError, extensions::*, state::State};

/// Login Request
#[derive(Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    /// Admin username
    #[serde(default)]
    pub username: String,

    /// Admin password
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"**redacted**")
            .finish()
    }
}

/// Login Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub message: String,

    /// Bearer token for admin routes
    pub token: String,

    pub username: String,

    /// When the token stops being accepted
    pub expires_at: String,
}

/// Admin Login Handler
///
/// Exchanges admin credentials for a bearer token.
#[endpoint(
    tags("auth"),
    summary = "Admin Login",
    responses(
        (status_code = StatusCode::OK, description = "Token issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Missing credentials"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid credentials"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> Result<Json<LoginResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let LoginRequest { username, password } = json.into_inner();
    let password = Zeroizing::new(password);

    let issued = state
        .app
        .auth
        .login(&username, &password, Timestamp::now())
        .await
        .map_err(into_api_error)?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_owned(),
        token: issued.token,
        username: issued.username,
        expires_at: issued.expires_at.to_string(),
    }))
}
