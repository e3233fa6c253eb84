//! Submit Message Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    errors::ApiError,
    extensions::*,
    messages::{
        errors::into_api_error,
        models::{MessageRequest, MessageResponse},
    },
    state::State,
};

/// Submit Message Handler
///
/// Public contact form. Name, email and message are all required.
#[endpoint(
    tags("messages"),
    summary = "Submit Message",
    responses((status_code = StatusCode::CREATED, description = "Message stored")),
)]
#[tracing::instrument(name = "messages.create", skip_all, err)]
pub(crate) async fn handler(
    json: JsonBody<MessageRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let message = state
        .app
        .messages
        .submit_message(json.into_inner().into())
        .await
        .map_err(into_api_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(message.into()))
}
