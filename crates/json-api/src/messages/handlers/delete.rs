//! Delete Message Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use umutoza_app::domain::messages::records::MessageUuid;

use crate::{
    errors::ApiError, extensions::*, messages::errors::into_api_error, responses::AckResponse,
    state::State,
};

/// Delete Message Handler
#[endpoint(
    tags("messages"),
    summary = "Delete Message",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    name = "messages.delete",
    skip_all,
    fields(message_uuid = %*message),
    err
)]
pub(crate) async fn handler(
    message: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AckResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .messages
        .delete_message(MessageUuid::from_uuid(message.into_inner()))
        .await
        .map_err(into_api_error)?;

    Ok(Json(AckResponse::with_message("Message deleted successfully")))
}
