//! List Questions Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    errors::ApiError,
    extensions::*,
    questions::{errors::into_api_error, models::QuestionResponse},
    state::State,
};

/// List Questions Handler
///
/// The whole question bank, newest first.
#[endpoint(tags("questions"), summary = "List Questions")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let questions = state
        .app
        .questions
        .list_questions()
        .await
        .map_err(into_api_error)?;

    Ok(Json(questions.into_iter().map(Into::into).collect()))
}
