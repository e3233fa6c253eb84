//! Session request and response bodies.

use jiff::Timestamp;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use umutoza_app::domain::sessions::{
    data::{Heartbeat, StartSession},
    records::{SessionRecord, SessionStatus},
};

use crate::{errors::ApiError, forms::FormInput};

/// Session Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionResponse {
    pub id: Uuid,
    pub user_name: String,
    pub user_image: Option<String>,
    pub score: i32,
    pub progress: u8,
    pub status: String,
    pub activity: String,
    pub start_time: String,
    pub last_active: String,

    /// Whether the session reported in recently enough to count as live
    pub is_online: bool,

    pub created_at: String,
    pub updated_at: String,
}

impl SessionResponse {
    pub(crate) fn at(record: SessionRecord, now: Timestamp) -> Self {
        let is_online = record.is_online(now);

        Self {
            id: record.uuid.into_uuid(),
            user_name: record.user_name,
            user_image: record.user_image,
            score: record.score,
            progress: record.progress,
            status: record.status.to_string(),
            activity: record.activity,
            start_time: record.start_time.to_string(),
            last_active: record.last_active.to_string(),
            is_online,
            created_at: record.created_at.to_string(),
            updated_at: record.updated_at.to_string(),
        }
    }
}

/// Read a start request from the `name`, `sessionId` and `userImage` form
/// fields. A `sessionId` that is not a UUID is treated as absent.
pub(crate) fn start_session(form: &mut FormInput) -> StartSession {
    StartSession {
        name: form.raw("name").unwrap_or_default().to_owned(),
        session: form
            .text("sessionId")
            .and_then(|value| value.parse::<Uuid>().ok())
            .map(Into::into),
        avatar: form.take_file("userImage"),
    }
}

/// Heartbeat Request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct HeartbeatRequest {
    pub score: Option<i32>,

    /// Percentage of the attempt answered, 0 to 100
    pub progress: Option<u8>,

    /// `active`, `pending` or `completed`
    pub status: Option<String>,

    pub activity: Option<String>,
    pub user_name: Option<String>,

    /// Set when the page is closing; the session goes offline at once
    pub is_leaving: bool,
}

impl TryFrom<HeartbeatRequest> for Heartbeat {
    type Error = ApiError;

    fn try_from(request: HeartbeatRequest) -> Result<Self, Self::Error> {
        let status = request
            .status
            .as_deref()
            .map(str::parse::<SessionStatus>)
            .transpose()
            .map_err(|source| ApiError::validation(source.to_string()))?;

        Ok(Self {
            score: request.score,
            progress: request.progress,
            status,
            activity: request.activity,
            user_name: request.user_name,
            is_leaving: request.is_leaving,
        })
    }
}

/// Rename Request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenameRequest {
    pub user_name: String,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn malformed_session_ids_start_fresh() {
        let mut form = FormInput::from_pairs([("name", " Aline "), ("sessionId", "not-a-uuid")]);

        let request = start_session(&mut form);

        assert_eq!(request.name, " Aline ", "name is passed through untrimmed");
        assert_eq!(request.session, None, "session");
        assert_eq!(request.avatar, None, "avatar");
    }

    #[test]
    fn heartbeat_statuses_are_parsed_case_insensitively() -> TestResult {
        let heartbeat = Heartbeat::try_from(HeartbeatRequest {
            status: Some("Completed".to_owned()),
            progress: Some(100),
            ..HeartbeatRequest::default()
        })?;

        assert_eq!(heartbeat.status, Some(SessionStatus::Completed), "status");
        assert_eq!(heartbeat.progress, Some(100), "progress");
        assert!(!heartbeat.is_leaving, "not leaving");

        Ok(())
    }

    #[test]
    fn unknown_heartbeat_status_is_rejected() {
        let result = Heartbeat::try_from(HeartbeatRequest {
            status: Some("finished".to_owned()),
            ..HeartbeatRequest::default()
        });

        assert!(result.is_err(), "unknown status");
    }
}
