//! Promotion Selection Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, QueryParam},
    prelude::*,
};

use crate::{
    errors::ApiError,
    extensions::*,
    promotions::{
        errors::into_api_error,
        models::{SelectionRequest, SelectionResponse},
    },
    state::State,
};

/// Promotion Selection Handler
///
/// Runs one rotation step for a viewer: given what they have on screen and
/// when they last saw each campaign, returns at most one popup and one bottom
/// bar. Newly surfaced campaigns are counted as impressions.
#[endpoint(tags("promotions"), summary = "Select Promotions")]
#[tracing::instrument(name = "promotions.selection", skip_all, err)]
pub(crate) async fn handler(
    at: QueryParam<String, false>,
    json: JsonBody<SelectionRequest>,
    depot: &mut Depot,
) -> Result<Json<SelectionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let point_in_time = at.into_point_in_time()?;
    let (previous, exposures) = json.into_inner().into_parts()?;

    let selection = state
        .app
        .promotions
        .select_promotions(previous, exposures, point_in_time)
        .await
        .map_err(into_api_error)?;

    Ok(Json(selection.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use umutoza_app::domain::promotions::{
        records::PromotionUuid,
        rotation::{ExposureLog, Rotation, Selection, Slot},
        service::{MockPromotionsService, PromotionSelection},
    };

    use crate::{promotions::handlers::tests::make_promotion, test_helpers::promotions_service};

    use super::*;

    fn make_service(promotions: MockPromotionsService) -> Service {
        promotions_service(promotions, Router::with_path("selection").post(handler))
    }

    #[tokio::test]
    async fn test_selection_round_trips_viewer_state() -> TestResult {
        let shown = PromotionUuid::new();
        let fresh = PromotionUuid::new();
        let at: Timestamp = "2026-03-01T10:10:00Z".parse()?;

        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_select_promotions()
            .once()
            .withf(move |previous, exposures, requested| {
                previous.popup.is_none()
                    && previous.bottom.map(|slot| slot.promotion) == Some(shown)
                    && exposures.len() == 1
                    && *requested == at
            })
            .return_once(move |_, mut exposures: ExposureLog, now| {
                exposures.insert(fresh, now);

                Ok(PromotionSelection {
                    rotation: Rotation {
                        selection: Selection {
                            popup: Some(Slot {
                                promotion: fresh,
                                shown_at: now,
                                dismiss_at: None,
                            }),
                            bottom: None,
                        },
                        surfaced: [fresh].into_iter().collect(),
                    },
                    exposures,
                    promotions: vec![make_promotion(fresh)],
                })
            });

        let mut res = TestClient::post("http://example.com/selection?at=2026-03-01T10:10:00Z")
            .json(&json!({
                "previous": {
                    "bottom": { "promotionId": shown.into_uuid(), "shownAt": 1_000 }
                },
                "exposures": { shown.to_string(): 1_000 }
            }))
            .send(&make_service(promotions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK), "status");

        let body: SelectionResponse = res.take_json().await?;

        assert_eq!(body.popup.map(|slot| slot.promotion_id), Some(fresh.into_uuid()), "popup");
        assert_eq!(body.bottom, None, "bottom bar cleared");
        assert_eq!(body.surfaced, vec![fresh.into_uuid()], "surfaced");
        assert_eq!(body.exposures.len(), 2, "history grows");
        assert_eq!(body.promotions.len(), 1, "details for on-screen campaigns");

        Ok(())
    }

    #[tokio::test]
    async fn test_selection_rejects_malformed_history() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions.expect_select_promotions().never();

        let res = TestClient::post("http://example.com/selection")
            .json(&json!({ "exposures": { "not-an-id": 1_000 } }))
            .send(&make_service(promotions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST), "status");

        Ok(())
    }
}
