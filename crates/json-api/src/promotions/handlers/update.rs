//! Update Promotion Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use umutoza_app::{domain::promotions::records::PromotionUuid, media::MediaKind};

use crate::{
    errors::ApiError,
    extensions::*,
    forms::FormInput,
    promotions::{
        errors::into_api_error,
        models::{PromotionResponse, promotion_patch},
    },
    state::State,
};

/// Update Promotion Handler
///
/// Only submitted fields change. Capacity is checked against the campaign as
/// it would be after the update; a new `media` file replaces the old one.
#[endpoint(
    tags("promotions"),
    summary = "Update Promotion",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promotion updated"),
        (status_code = StatusCode::CONFLICT, description = "Capacity exceeded"),
    ),
)]
#[tracing::instrument(
    name = "promotions.update",
    skip_all,
    fields(promotion_uuid = %*promotion),
    err
)]
pub(crate) async fn handler(
    promotion: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<PromotionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_401()?;
    let uuid = PromotionUuid::from_uuid(promotion.into_inner());

    let mut form = FormInput::read(req, MediaKind::Promotion).await?;
    let patch = promotion_patch(&form)?;
    let media = form.take_file("media");

    let promotion = state
        .app
        .promotions
        .update_promotion(uuid, patch, media)
        .await
        .map_err(into_api_error)?;

    tracing::info!(admin = %admin.username, promotion_uuid = %uuid, "promotion updated");

    Ok(Json(promotion.into()))
}
