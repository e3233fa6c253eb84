//! List Sessions Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use crate::{
    errors::ApiError,
    extensions::*,
    sessions::{errors::into_api_error, models::SessionResponse},
    state::State,
};

/// List Sessions Handler
///
/// The most recently active sessions, newest first, each with its current
/// online flag.
#[endpoint(
    tags("sessions"),
    summary = "List Sessions",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let sessions = state
        .app
        .sessions
        .list_recent_sessions()
        .await
        .map_err(into_api_error)?;

    let now = Timestamp::now();

    Ok(Json(
        sessions
            .into_iter()
            .map(|session| SessionResponse::at(session, now))
            .collect(),
    ))
}
