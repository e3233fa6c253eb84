//! Delete Question Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use umutoza_app::domain::questions::records::QuestionUuid;

use crate::{
    errors::ApiError, extensions::*, questions::errors::into_api_error, responses::AckResponse,
    state::State,
};

/// Delete Question Handler
///
/// Removes the question and its image.
#[endpoint(
    tags("questions"),
    summary = "Delete Question",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    name = "questions.delete",
    skip_all,
    fields(question_uuid = %*question),
    err
)]
pub(crate) async fn handler(
    question: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AckResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_401()?;
    let uuid = QuestionUuid::from_uuid(question.into_inner());

    state
        .app
        .questions
        .delete_question(uuid)
        .await
        .map_err(into_api_error)?;

    tracing::info!(admin = %admin.username, question_uuid = %uuid, "question deleted");

    Ok(Json(AckResponse::with_message("Question deleted")))
}
