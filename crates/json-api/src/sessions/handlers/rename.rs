//! Rename Session Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use umutoza_app::domain::sessions::records::SessionUuid;

use crate::{
    errors::ApiError,
    extensions::*,
    sessions::{
        errors::into_api_error,
        models::{RenameRequest, SessionResponse},
    },
    state::State,
};

/// Rename Session Handler
///
/// Changes the display name of a live session. The new name must not be held
/// by another live session.
#[endpoint(tags("sessions"), summary = "Rename Session")]
#[tracing::instrument(
    name = "sessions.rename",
    skip_all,
    fields(session_uuid = %*session),
    err
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    json: JsonBody<RenameRequest>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();
    let now = Timestamp::now();

    let session = state
        .app
        .sessions
        .rename_session(
            SessionUuid::from_uuid(session.into_inner()),
            &request.user_name,
            now,
        )
        .await
        .map_err(into_api_error)?;

    Ok(Json(SessionResponse::at(session, now)))
}
