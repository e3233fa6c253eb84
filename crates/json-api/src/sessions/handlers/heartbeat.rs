//! Session Heartbeat Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use umutoza_app::domain::sessions::{data::Heartbeat, records::SessionUuid};

use crate::{
    errors::ApiError,
    extensions::*,
    sessions::{
        errors::into_api_error,
        models::{HeartbeatRequest, SessionResponse},
    },
    state::State,
};

/// Session Heartbeat Handler
///
/// Sent every few seconds by a running quiz. Fields left out keep their
/// stored values.
#[endpoint(tags("sessions"), summary = "Session Heartbeat")]
#[tracing::instrument(
    name = "sessions.heartbeat",
    skip_all,
    fields(session_uuid = %*session),
    err
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    json: JsonBody<HeartbeatRequest>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let heartbeat = Heartbeat::try_from(json.into_inner())?;
    let now = Timestamp::now();

    let session = state
        .app
        .sessions
        .record_heartbeat(SessionUuid::from_uuid(session.into_inner()), heartbeat, now)
        .await
        .map_err(into_api_error)?;

    Ok(Json(SessionResponse::at(session, now)))
}
