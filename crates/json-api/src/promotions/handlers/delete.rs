//! Delete Promotion Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use umutoza_app::domain::promotions::records::PromotionUuid;

use crate::{
    errors::ApiError, extensions::*, promotions::errors::into_api_error,
    responses::AckResponse, state::State,
};

/// Delete Promotion Handler
///
/// Removes the campaign and any media file it owns.
#[endpoint(
    tags("promotions"),
    summary = "Delete Promotion",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    name = "promotions.delete",
    skip_all,
    fields(promotion_uuid = %*promotion),
    err
)]
pub(crate) async fn handler(
    promotion: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AckResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_401()?;
    let uuid = PromotionUuid::from_uuid(promotion.into_inner());

    state
        .app
        .promotions
        .delete_promotion(uuid)
        .await
        .map_err(into_api_error)?;

    tracing::info!(admin = %admin.username, promotion_uuid = %uuid, "promotion deleted");

    Ok(Json(AckResponse::with_message(
        "Promotion deleted successfully",
    )))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use umutoza_app::domain::promotions::{PromotionsServiceError, service::MockPromotionsService};

    use crate::test_helpers::promotions_service;

    use super::*;

    fn make_service(promotions: MockPromotionsService) -> Service {
        promotions_service(
            promotions,
            Router::with_path("promotions/{promotion}").delete(handler),
        )
    }

    #[tokio::test]
    async fn test_delete_acknowledges_with_message() -> TestResult {
        let uuid = PromotionUuid::new();

        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_delete_promotion()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(|_| Ok(()));

        let body: AckResponse = TestClient::delete(format!("http://example.com/promotions/{uuid}"))
            .send(&make_service(promotions))
            .await
            .take_json()
            .await?;

        assert_eq!(
            body.message.as_deref(),
            Some("Promotion deleted successfully"),
            "message"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unknown_promotion_returns_404() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_delete_promotion()
            .once()
            .return_once(|_| Err(PromotionsServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/promotions/{}", Uuid::now_v7()))
            .send(&make_service(promotions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND), "status");

        Ok(())
    }
}
