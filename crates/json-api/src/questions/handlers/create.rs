//! Create Question Handler

use std::sync::Arc;

use salvo::prelude::*;

use umutoza_app::media::MediaKind;

use crate::{
    errors::ApiError,
    extensions::*,
    forms::FormInput,
    questions::{
        errors::into_api_error,
        models::{QuestionResponse, question_draft},
    },
    responses,
    state::State,
};

/// Create Question Handler
///
/// Accepts a multipart form with an optional `questionImage`. A question whose
/// text and options match an existing one exactly is refused with 409.
#[endpoint(
    tags("questions"),
    summary = "Create Question",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Question created"),
        (status_code = StatusCode::CONFLICT, description = "Duplicate question"),
    ),
)]
#[tracing::instrument(name = "questions.create", skip_all, err)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<QuestionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_401()?;

    let mut form = FormInput::read(req, MediaKind::Image).await?;
    let draft = question_draft(&form)?;
    let image = form.take_file("questionImage");

    let question = state
        .app
        .questions
        .create_question(draft, image)
        .await
        .map_err(into_api_error)?;

    tracing::info!(admin = %admin.username, question_uuid = %question.uuid, "question created");

    responses::created_at(res, &format!("/api/questions/{}", question.uuid))?;

    Ok(Json(question.into()))
}
