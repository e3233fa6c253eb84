//! Mark Message Read Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use umutoza_app::domain::messages::records::MessageUuid;

use crate::{
    errors::ApiError,
    extensions::*,
    messages::{errors::into_api_error, models::MessageResponse},
    state::State,
};

/// Mark Message Read Handler
#[endpoint(
    tags("messages"),
    summary = "Mark Message Read",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    name = "messages.read",
    skip_all,
    fields(message_uuid = %*message),
    err
)]
pub(crate) async fn handler(
    message: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let message = state
        .app
        .messages
        .mark_read(MessageUuid::from_uuid(message.into_inner()))
        .await
        .map_err(into_api_error)?;

    Ok(Json(message.into()))
}
