//! Promotion Index Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    errors::ApiError,
    extensions::*,
    promotions::{errors::into_api_error, models::PromotionResponse},
    state::State,
};

/// Promotion Index Handler
///
/// Returns every campaign, newest first.
#[endpoint(
    tags("promotions"),
    summary = "List Promotions",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<PromotionResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let promotions = state
        .app
        .promotions
        .list_promotions()
        .await
        .map_err(into_api_error)?;

    Ok(Json(promotions.into_iter().map(Into::into).collect()))
}
