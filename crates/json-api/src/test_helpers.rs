//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use umutoza_app::{
    auth::{AdminIdentity, AdminUuid, MockAuthService},
    context::AppContext,
    domain::{
        messages::service::MockMessagesService,
        promotions::service::MockPromotionsService,
        questions::service::MockQuestionsService,
        sessions::service::MockSessionsService,
    },
};

use crate::{
    extensions::*,
    state::{self, State},
};

pub(crate) const TEST_ADMIN_UUID: AdminUuid = AdminUuid::from_uuid(Uuid::nil());

/// Fixed clock reading for records built in tests.
pub(crate) const TEST_TIME: Timestamp = Timestamp::UNIX_EPOCH;

#[salvo::handler]
pub(crate) async fn inject_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_admin(AdminIdentity {
        admin_uuid: TEST_ADMIN_UUID,
        username: "admin".to_owned(),
    });

    ctrl.call_next(req, depot, res).await;
}

/// Service mocks with no expectations; any call fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub(crate) promotions: MockPromotionsService,
    pub(crate) sessions: MockSessionsService,
    pub(crate) questions: MockQuestionsService,
    pub(crate) messages: MockMessagesService,
    pub(crate) auth: MockAuthService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        state::shared(AppContext {
            promotions: Arc::new(self.promotions),
            sessions: Arc::new(self.sessions),
            questions: Arc::new(self.questions),
            messages: Arc::new(self.messages),
            auth: Arc::new(self.auth),
        })
    }

    /// Serve `route` as an authenticated admin.
    pub(crate) fn into_service(self, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(inject_admin)
                .push(route),
        )
    }
}

pub(crate) fn promotions_service(promotions: MockPromotionsService, route: Router) -> Service {
    Mocks {
        promotions,
        ..Mocks::default()
    }
    .into_service(route)
}

pub(crate) fn sessions_service(sessions: MockSessionsService, route: Router) -> Service {
    Mocks {
        sessions,
        ..Mocks::default()
    }
    .into_service(route)
}

pub(crate) fn questions_service(questions: MockQuestionsService, route: Router) -> Service {
    Mocks {
        questions,
        ..Mocks::default()
    }
    .into_service(route)
}

pub(crate) fn messages_service(messages: MockMessagesService, route: Router) -> Service {
    Mocks {
        messages,
        ..Mocks::default()
    }
    .into_service(route)
}

/// Serve `route` without an authenticated admin.
pub(crate) fn auth_service(auth: MockAuthService, route: Router) -> Service {
    let state = Mocks {
        auth,
        ..Mocks::default()
    }
    .into_state();

    Service::new(Router::new().hoop(inject(state)).push(route))
}

/// Encode `fields` and `files` as a `multipart/form-data` body, returning
/// the content type header value and the body.
pub(crate) fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "umutoza-test-boundary";

    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    for (name, file_name, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
