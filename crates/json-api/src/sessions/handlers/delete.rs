//! Delete Session Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use umutoza_app::domain::sessions::records::SessionUuid;

use crate::{
    errors::ApiError, extensions::*, responses::AckResponse, sessions::errors::into_api_error,
    state::State,
};

/// Delete Session Handler
#[endpoint(
    tags("sessions"),
    summary = "Delete Session",
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    name = "sessions.delete",
    skip_all,
    fields(session_uuid = %*session),
    err
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AckResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.admin_or_401()?;
    let uuid = SessionUuid::from_uuid(session.into_inner());

    state
        .app
        .sessions
        .delete_session(uuid)
        .await
        .map_err(into_api_error)?;

    tracing::info!(admin = %admin.username, session_uuid = %uuid, "session deleted");

    Ok(Json(AckResponse::with_message("Session deleted successfully")))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use umutoza_app::domain::sessions::{SessionsServiceError, service::MockSessionsService};

    use crate::test_helpers::sessions_service;

    use super::*;

    fn make_service(sessions: MockSessionsService) -> Service {
        sessions_service(sessions, Router::with_path("sessions/{session}").delete(handler))
    }

    #[tokio::test]
    async fn test_delete_acknowledges() -> TestResult {
        let uuid = SessionUuid::new();

        let mut sessions = MockSessionsService::new();

        sessions
            .expect_delete_session()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(|_| Ok(()));

        let body: AckResponse = TestClient::delete(format!("http://example.com/sessions/{uuid}"))
            .send(&make_service(sessions))
            .await
            .take_json()
            .await?;

        assert_eq!(
            body,
            AckResponse::with_message("Session deleted successfully"),
            "ack"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_unknown_session_returns_404() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions
            .expect_delete_session()
            .once()
            .return_once(|_| Err(SessionsServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/sessions/{}", Uuid::now_v7()))
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND), "status");

        Ok(())
    }
}
