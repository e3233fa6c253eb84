//! Quiz Attempt Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    errors::ApiError,
    extensions::*,
    questions::{
        errors::into_api_error,
        models::{AttemptRequest, AttemptResponse},
    },
    state::State,
};

/// Quiz Attempt Handler
///
/// Draws a shuffled set of questions for one attempt, preferring questions
/// the player has not seen. Each question's options are shuffled too, with
/// `correctAnswerIndex` following the correct option.
#[endpoint(tags("questions"), summary = "Start Quiz Attempt")]
#[tracing::instrument(name = "questions.attempts", skip_all, err)]
pub(crate) async fn handler(
    json: JsonBody<AttemptRequest>,
    depot: &mut Depot,
) -> Result<Json<AttemptResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();
    let count = request.count();

    let seen = request.seen_ids.into_iter().map(Into::into).collect();

    let questions = state
        .app
        .questions
        .sample_attempt(seen, count)
        .await
        .map_err(into_api_error)?;

    Ok(Json(AttemptResponse {
        questions: questions.into_iter().map(Into::into).collect(),
    }))
}
