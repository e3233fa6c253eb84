//! Record Impression Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use umutoza_app::domain::promotions::records::PromotionUuid;

use crate::{
    errors::ApiError, extensions::*, promotions::errors::into_api_error,
    responses::AckResponse, state::State,
};

/// Record Impression Handler
///
/// Called by clients each time a campaign is rendered.
#[endpoint(tags("promotions"), summary = "Record Impression")]
pub(crate) async fn handler(
    promotion: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AckResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .promotions
        .record_impression(PromotionUuid::from_uuid(promotion.into_inner()))
        .await
        .map_err(into_api_error)?;

    Ok(Json(AckResponse::ok()))
}
