//! Get Promotion Handler

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

/// Get Promotion Handler
#[endpoint(
    tags("promotions"),
    summary = "Get Promotion",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    promotion: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PromotionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let promotion = state
        .app
        .promotions
        .get_promotion(PromotionUuid::from_uuid(promotion.into_inner()))
        .await
        .map_err(into_api_error)?;

    Ok(Json(promotion.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use umutoza_app::domain::promotions::{PromotionsServiceError, service::MockPromotionsService};

    use crate::{promotions::handlers::tests::make_promotion, test_helpers::promotions_service};

    use super::*;

    fn make_service(promotions: MockPromotionsService) -> Service {
        promotions_service(
            promotions,
            Router::with_path("promotions/{promotion}").get(handler),
        )
    }

    #[tokio::test]
    async fn test_get_returns_promotion() -> TestResult {
        let uuid = PromotionUuid::new();

        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_get_promotion()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| Ok(make_promotion(uuid)));

        let body: PromotionResponse = TestClient::get(format!("http://example.com/promotions/{uuid}"))
            .send(&make_service(promotions))
            .await
            .take_json()
            .await?;

        assert_eq!(body.id, uuid.into_uuid(), "id");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_promotion_returns_404() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_get_promotion()
            .once()
            .return_once(|_| Err(PromotionsServiceError::NotFound));

        let mut res = TestClient::get(format!("http://example.com/promotions/{}", Uuid::now_v7()))
            .send(&make_service(promotions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND), "status");

        let body: serde_json::Value = res.take_json().await?;

        assert_eq!(body["message"], "Promotion not found", "message");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_malformed_id_returns_400() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions.expect_get_promotion().never();

        let res = TestClient::get("http://example.com/promotions/abc")
            .send(&make_service(promotions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST), "status");

        Ok(())
    }
}
