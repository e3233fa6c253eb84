//! List Messages Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    errors::ApiError,
    extensions::*,
    messages::{errors::into_api_error, models::MessageResponse},
    state::State,
};

/// List Messages Handler
#[endpoint(
    tags("messages"),
    summary = "List Messages",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let messages = state
        .app
        .messages
        .list_messages()
        .await
        .map_err(into_api_error)?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}
