//! Create Promotion Handler

use std::sync::Arc;

use salvo::prelude::*;

use umutoza_app::media::MediaKind;

use crate::{
    errors::ApiError,
    extensions::*,
    forms::FormInput,
    promotions::{
        errors::into_api_error,
        models::{PromotionResponse, promotion_patch},
    },
    responses,
    state::State,
};

/// Create Promotion Handler
///
/// Accepts a multipart form with an optional `media` file. Fields left out
/// take their defaults; the campaign is refused with 409 when its minutes do
/// not fit the placement's remaining hourly budget.
#[endpoint(
    tags("promotions"),
    summary = "Create Promotion",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Promotion created"),
        (status_code = StatusCode::CONFLICT, description = "Capacity exceeded"),
    ),
)]
#[tracing::instrument(name = "promotions.create", skip_all, err)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PromotionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_401()?;

    let mut form = FormInput::read(req, MediaKind::Promotion).await?;
    let patch = promotion_patch(&form)?;
    let media = form.take_file("media");

    let promotion = state
        .app
        .promotions
        .create_promotion(patch, media)
        .await
        .map_err(into_api_error)?;

    tracing::info!(admin = %admin.username, promotion_uuid = %promotion.uuid, "promotion created");

    responses::created_at(res, &format!("/api/promotions/{}", promotion.uuid))?;

    Ok(Json(promotion.into()))
}

#[cfg(test)]
mod tests {
    use salvo::{
        http::header::{CONTENT_TYPE, LOCATION},
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use umutoza_app::domain::promotions::{
        PromotionsServiceError,
        capacity::CapacityConflict,
        data::{PromotionDraft, PromotionPatch},
        records::PromotionUuid,
        schedule::Placement,
        service::MockPromotionsService,
    };

    use crate::{
        promotions::handlers::tests::make_promotion,
        test_helpers::{multipart_body, promotions_service},
    };

    use super::*;

    fn make_service(promotions: MockPromotionsService) -> Service {
        promotions_service(promotions, Router::with_path("promotions").post(handler))
    }

    #[tokio::test]
    async fn test_create_promotion_with_media_returns_201() -> TestResult {
        let uuid = PromotionUuid::new();

        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_create_promotion()
            .once()
            .withf(|patch, media| {
                patch.name.as_deref() == Some("Spring")
                    && patch.placement == Some(Placement::Bottom)
                    && patch.minutes_per_hour == Some(30)
                    && media.as_ref().is_some_and(|upload| {
                        upload.file_name.as_deref() == Some("clip.mp4")
                            && upload.content_type.as_deref() == Some("video/mp4")
                            && upload.size == 4
                    })
            })
            .return_once(move |patch, _| {
                let draft = patch.apply(PromotionDraft::default());
                let mut promotion = make_promotion(uuid);

                promotion.creative = draft.creative;
                promotion.schedule = draft.schedule;

                Ok(promotion)
            });

        let (content_type, body) = multipart_body(
            &[("name", "Spring"), ("type", "bottom"), ("minutesPerHour", "30")],
            &[("media", "clip.mp4", "video/mp4", b"mp4!".as_slice())],
        );

        let mut res = TestClient::post("http://example.com/promotions")
            .add_header(CONTENT_TYPE, content_type, true)
            .body(body)
            .send(&make_service(promotions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED), "status");

        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        let body: PromotionResponse = res.take_json().await?;

        assert_eq!(location, Some(format!("/api/promotions/{uuid}")), "location");
        assert_eq!(body.placement, "bottom", "placement");
        assert_eq!(body.minutes_per_hour, 30, "minutes");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_promotion_over_capacity_returns_409_with_conflicts() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_create_promotion()
            .once()
            .withf(|patch: &PromotionPatch, media| patch.minutes_per_hour == Some(25) && media.is_none())
            .return_once(|_, _| {
                Err(PromotionsServiceError::CapacityExceeded(vec![CapacityConflict {
                    hour: 8,
                    available: 20,
                    requested: 25,
                    overage: 5,
                }]))
            });

        let mut res = TestClient::post("http://example.com/promotions")
            .raw_form("minutesPerHour=25&targetHours=8")
            .send(&make_service(promotions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT), "status");

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(body["error"], "capacity_exceeded", "code");
        assert_eq!(body["conflicts"][0]["hour"], 8, "hour");
        assert_eq!(body["conflicts"][0]["available"], 20, "available");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_promotion_with_bad_number_returns_400() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions.expect_create_promotion().never();

        let res = TestClient::post("http://example.com/promotions")
            .raw_form("priority=high")
            .send(&make_service(promotions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST), "status");

        Ok(())
    }
}
