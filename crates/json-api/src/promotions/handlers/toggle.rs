//! Toggle Promotion Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use umutoza_app::domain::promotions::records::PromotionUuid;

use crate::{
    errors::ApiError,
    extensions::*,
    promotions::{errors::into_api_error, models::PromotionResponse},
    state::State,
};

/// Toggle Promotion Handler
///
/// Flips `isActive`. Re-activation is refused with 409 when the campaign no
/// longer fits its placement's hourly budget.
#[endpoint(
    tags("promotions"),
    summary = "Toggle Promotion",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    name = "promotions.toggle",
    skip_all,
    fields(promotion_uuid = %*promotion),
    err
)]
pub(crate) async fn handler(
    promotion: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PromotionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let promotion = state
        .app
        .promotions
        .toggle_promotion(PromotionUuid::from_uuid(promotion.into_inner()))
        .await
        .map_err(into_api_error)?;

    Ok(Json(promotion.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use umutoza_app::domain::promotions::{
        PromotionsServiceError, capacity::CapacityConflict, service::MockPromotionsService,
    };

    use crate::{promotions::handlers::tests::make_promotion, test_helpers::promotions_service};

    use super::*;

    fn make_service(promotions: MockPromotionsService) -> Service {
        promotions_service(
            promotions,
            Router::with_path("promotions/{promotion}/toggle").patch(handler),
        )
    }

    #[tokio::test]
    async fn test_toggle_returns_updated_promotion() -> TestResult {
        let uuid = PromotionUuid::new();

        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_toggle_promotion()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| {
                let mut promotion = make_promotion(uuid);

                promotion.is_active = false;

                Ok(promotion)
            });

        let body: PromotionResponse =
            TestClient::patch(format!("http://example.com/promotions/{uuid}/toggle"))
                .send(&make_service(promotions))
                .await
                .take_json()
                .await?;

        assert!(!body.is_active, "campaign paused");

        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_into_full_hours_returns_409() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions.expect_toggle_promotion().once().return_once(|_| {
            Err(PromotionsServiceError::CapacityExceeded(vec![CapacityConflict {
                hour: 0,
                available: 0,
                requested: 60,
                overage: 60,
            }]))
        });

        let res = TestClient::patch(format!(
            "http://example.com/promotions/{}/toggle",
            Uuid::now_v7()
        ))
        .send(&make_service(promotions))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT), "status");

        Ok(())
    }
}
