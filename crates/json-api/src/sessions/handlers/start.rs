//! Start Session Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use umutoza_app::media::MediaKind;

use crate::{
    errors::ApiError,
    extensions::*,
    forms::FormInput,
    sessions::{
        errors::into_api_error,
        models::{SessionResponse, start_session},
    },
    state::State,
};

/// Start Session Handler
///
/// Takes a display name, an optional `sessionId` held from a previous visit
/// and an optional `userImage` avatar. Presenting the id of your own session
/// under the same name resumes it (200); otherwise a new session is created
/// (201). A name held by another live session is refused with 409.
#[endpoint(
    tags("sessions"),
    summary = "Start Session",
    responses(
        (status_code = StatusCode::CREATED, description = "Session created"),
        (status_code = StatusCode::OK, description = "Session resumed"),
        (status_code = StatusCode::CONFLICT, description = "Name taken"),
    ),
)]
#[tracing::instrument(name = "sessions.start", skip_all, err)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SessionResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let mut form = FormInput::read(req, MediaKind::Image).await?;
    let now = Timestamp::now();

    let started = state
        .app
        .sessions
        .start_session(start_session(&mut form), now)
        .await
        .map_err(into_api_error)?;

    if started.is_created() {
        res.status_code(StatusCode::CREATED);
    }

    Ok(Json(SessionResponse::at(started.into_record(), now)))
}

#[cfg(test)]
mod tests {
    use salvo::{
        http::header::CONTENT_TYPE,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use umutoza_app::domain::sessions::{
        SessionsServiceError,
        data::SessionStart,
        records::SessionUuid,
        service::MockSessionsService,
    };

    use crate::{
        sessions::handlers::tests::make_session,
        test_helpers::{multipart_body, sessions_service},
    };

    use super::*;

    fn make_service(sessions: MockSessionsService) -> Service {
        sessions_service(sessions, Router::with_path("sessions").post(handler))
    }

    #[tokio::test]
    async fn test_new_session_returns_201_with_avatar() -> TestResult {
        let uuid = SessionUuid::new();

        let mut sessions = MockSessionsService::new();

        sessions
            .expect_start_session()
            .once()
            .withf(|request, _| {
                request.name == "Aline"
                    && request.session.is_none()
                    && request
                        .avatar
                        .as_ref()
                        .is_some_and(|avatar| avatar.file_name.as_deref() == Some("me.png"))
            })
            .return_once(move |_, _| Ok(SessionStart::Created(make_session(uuid, "Aline"))));

        let (content_type, body) = multipart_body(
            &[("name", "Aline")],
            &[("userImage", "me.png", "image/png", b"png".as_slice())],
        );

        let mut res = TestClient::post("http://example.com/sessions")
            .add_header(CONTENT_TYPE, content_type, true)
            .body(body)
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED), "status");

        let session: SessionResponse = res.take_json().await?;

        assert_eq!(session.id, uuid.into_uuid(), "id");
        assert_eq!(session.user_name, "Aline", "name");
        assert!(!session.is_online, "epoch heartbeat is stale");

        Ok(())
    }

    #[tokio::test]
    async fn test_avatar_larger_than_default_body_limit_is_accepted() -> TestResult {
        let uuid = SessionUuid::new();
        let avatar = vec![0_u8; 200 * 1024];

        let mut sessions = MockSessionsService::new();

        sessions
            .expect_start_session()
            .once()
            .withf(|request, _| {
                request
                    .avatar
                    .as_ref()
                    .is_some_and(|avatar| avatar.size == 200 * 1024)
            })
            .return_once(move |_, _| Ok(SessionStart::Created(make_session(uuid, "Aline"))));

        let (content_type, body) = multipart_body(
            &[("name", "Aline")],
            &[("userImage", "me.png", "image/png", avatar.as_slice())],
        );

        let res = TestClient::post("http://example.com/sessions")
            .add_header(CONTENT_TYPE, content_type, true)
            .body(body)
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED), "status");

        Ok(())
    }

    #[tokio::test]
    async fn test_body_beyond_image_allowance_returns_400() -> TestResult {
        let avatar = vec![0_u8; 6 * 1024 * 1024];

        let mut sessions = MockSessionsService::new();

        sessions.expect_start_session().never();

        let (content_type, body) = multipart_body(
            &[("name", "Aline")],
            &[("userImage", "me.png", "image/png", avatar.as_slice())],
        );

        let mut res = TestClient::post("http://example.com/sessions")
            .add_header(CONTENT_TYPE, content_type, true)
            .body(body)
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST), "status");

        let error: serde_json::Value = res.take_json().await?;
        let message = error["message"].as_str().unwrap_or_default();

        assert!(message.starts_with("request body exceeds the"), "message: {message}");

        Ok(())
    }

    #[tokio::test]
    async fn test_resumed_session_returns_200() -> TestResult {
        let uuid = SessionUuid::new();

        let mut sessions = MockSessionsService::new();

        sessions
            .expect_start_session()
            .once()
            .withf(move |request, _| request.session == Some(uuid))
            .return_once(move |_, _| Ok(SessionStart::Resumed(make_session(uuid, "Aline"))));

        let res = TestClient::post("http://example.com/sessions")
            .raw_form(format!("name=Aline&sessionId={uuid}"))
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK), "status");

        Ok(())
    }

    #[tokio::test]
    async fn test_taken_name_returns_409() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions
            .expect_start_session()
            .once()
            .return_once(|_, _| Err(SessionsServiceError::NameTaken));

        let res = TestClient::post("http://example.com/sessions")
            .raw_form("name=Aline")
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT), "status");

        Ok(())
    }
}
