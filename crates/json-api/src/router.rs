//! API Router

use salvo::Router;

use crate::{auth, messages, promotions, questions, sessions};

/// Routes mounted under `/api`. Public routes are matched first; the admin
/// group only runs its bearer check when one of its routes matches.
pub(crate) fn api_router() -> Router {
    Router::with_path("api")
        .push(public_router())
        .push(admin_router())
}

fn public_router() -> Router {
    Router::new()
        .push(
            Router::with_path("promotions")
                .push(
                    Router::with_path("public")
                        .get(promotions::public::handler)
                        .push(
                            Router::with_path("selection").post(promotions::selection::handler),
                        ),
                )
                .push(
                    Router::with_path("{promotion}")
                        .push(
                            Router::with_path("impression").post(promotions::impression::handler),
                        )
                        .push(Router::with_path("click").post(promotions::click::handler)),
                ),
        )
        .push(
            Router::with_path("sessions")
                .push(Router::with_path("start").post(sessions::start::handler))
                .push(
                    Router::with_path("{session}")
                        .put(sessions::heartbeat::handler)
                        .push(Router::with_path("name").put(sessions::rename::handler)),
                ),
        )
        .push(
            Router::with_path("admin/quiz")
                .get(questions::index::handler)
                .push(Router::with_path("login").post(auth::login::handler)),
        )
        .push(Router::with_path("quiz/attempts").post(questions::attempts::handler))
        .push(Router::with_path("messages").post(messages::create::handler))
}

fn admin_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("promotions")
                .get(promotions::index::handler)
                .post(promotions::create::handler)
                .push(
                    Router::with_path("{promotion}")
                        .get(promotions::get::handler)
                        .put(promotions::update::handler)
                        .delete(promotions::delete::handler)
                        .push(Router::with_path("toggle").patch(promotions::toggle::handler)),
                ),
        )
        .push(
            Router::with_path("sessions")
                .get(sessions::index::handler)
                .push(Router::with_path("{session}").delete(sessions::delete::handler)),
        )
        .push(
            Router::with_path("admin/quiz")
                .post(questions::create::handler)
                .push(
                    Router::with_path("{question}")
                        .put(questions::update::handler)
                        .delete(questions::delete::handler),
                ),
        )
        .push(
            Router::with_path("messages")
                .get(messages::index::handler)
                .push(
                    Router::with_path("{message}")
                        .delete(messages::delete::handler)
                        .push(Router::with_path("read").put(messages::read::handler)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        http::header::AUTHORIZATION,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::Value;
    use testresult::TestResult;
    use uuid::Uuid;

    use umutoza_app::{
        auth::AuthServiceError,
        domain::promotions::service::MockPromotionsService,
    };

    use crate::test_helpers::Mocks;

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(mocks.into_state()))
                .push(api_router()),
        )
    }

    #[tokio::test]
    async fn test_public_catalog_needs_no_token() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_list_public_promotions()
            .once()
            .return_once(|_| Ok(Vec::new()));

        let body: Value = TestClient::get("http://example.com/api/promotions/public")
            .send(&make_service(Mocks {
                promotions,
                ..Mocks::default()
            }))
            .await
            .take_json()
            .await?;

        assert_eq!(body, Value::Array(Vec::new()), "empty catalog");

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes_require_a_token() -> TestResult {
        let res = TestClient::get("http://example.com/api/promotions")
            .send(&make_service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED), "status");

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected_before_the_handler() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .auth
            .expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::NotFound));

        let url = format!("http://example.com/api/messages/{}", Uuid::now_v7());

        let res = TestClient::delete(url)
            .add_header(AUTHORIZATION, "Bearer um_bogus", true)
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED), "status");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_paths_are_not_found() -> TestResult {
        let res = TestClient::get("http://example.com/api/nowhere")
            .send(&make_service(Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND), "status");

        Ok(())
    }
}
