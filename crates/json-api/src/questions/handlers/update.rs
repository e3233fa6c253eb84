//! Update Question Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use umutoza_app::{domain::questions::records::QuestionUuid, media::MediaKind};

use crate::{
    errors::ApiError,
    extensions::*,
    forms::FormInput,
    questions::{
        errors::into_api_error,
        models::{QuestionUpdatedResponse, question_draft},
    },
    state::State,
};

/// Update Question Handler
///
/// Replaces the question's content. A new `questionImage` replaces the stored
/// image; leaving `difficulty` blank keeps the current one.
#[endpoint(
    tags("questions"),
    summary = "Update Question",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    name = "questions.update",
    skip_all,
    fields(question_uuid = %*question),
    err
)]
pub(crate) async fn handler(
    question: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<QuestionUpdatedResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_401()?;
    let uuid = QuestionUuid::from_uuid(question.into_inner());

    let mut form = FormInput::read(req, MediaKind::Image).await?;
    let draft = question_draft(&form)?;
    let image = form.take_file("questionImage");

    let question = state
        .app
        .questions
        .update_question(uuid, draft, image)
        .await
        .map_err(into_api_error)?;

    tracing::info!(admin = %admin.username, question_uuid = %uuid, "question updated");

    Ok(Json(QuestionUpdatedResponse {
        message: "Question updated".to_owned(),
        question: question.into(),
    }))
}
