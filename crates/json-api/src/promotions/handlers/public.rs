//! Public Promotions Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use crate::{
    errors::ApiError,
    extensions::*,
    promotions::{errors::into_api_error, models::PromotionResponse},
    state::State,
};

/// Public Promotions Handler
///
/// Returns the active campaigns whose date window contains `at` (default:
/// now), highest priority first, for clients that rotate on their own.
#[endpoint(tags("promotions"), summary = "List Running Promotions")]
pub(crate) async fn handler(
    at: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<Vec<PromotionResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let point_in_time = at.into_point_in_time()?;

    let promotions = state
        .app
        .promotions
        .list_public_promotions(point_in_time)
        .await
        .map_err(into_api_error)?;

    Ok(Json(promotions.into_iter().map(Into::into).collect()))
}
