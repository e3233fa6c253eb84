//! Session Data

use crate::{
    domain::sessions::records::{SessionRecord, SessionStatus, SessionUuid},
    media::MediaUpload,
};

/// Activity label for a freshly started session.
pub const STARTED_ACTIVITY: &str = "Yatangiye";

/// Activity label for a session picked up again by its holder.
pub const RESUMED_ACTIVITY: &str = "Yagarutse";

/// A request to start, or pick back up, a quiz session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartSession {
    /// Requested display name, untrimmed.
    pub name: String,

    /// Session the caller held before, if any.
    pub session: Option<SessionUuid>,

    pub avatar: Option<MediaUpload>,
}

/// How a start request was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStart {
    Created(SessionRecord),
    Resumed(SessionRecord),
}

impl SessionStart {
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    #[must_use]
    pub fn record(&self) -> &SessionRecord {
        match self {
            Self::Created(record) | Self::Resumed(record) => record,
        }
    }

    #[must_use]
    pub fn into_record(self) -> SessionRecord {
        match self {
            Self::Created(record) | Self::Resumed(record) => record,
        }
    }
}

/// Periodic progress report from a running quiz. Absent fields keep their
/// stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heartbeat {
    pub score: Option<i32>,
    pub progress: Option<u8>,
    pub status: Option<SessionStatus>,
    pub activity: Option<String>,
    pub user_name: Option<String>,

    /// Best-effort signal sent when the tab closes.
    pub is_leaving: bool,
}

/// Values written by a heartbeat after normalisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SessionUpdate {
    pub user_name: Option<String>,
    pub score: Option<i32>,
    pub progress: Option<u8>,
    pub status: Option<SessionStatus>,
    pub activity: Option<String>,
}

/// Values for a new session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewSession {
    pub uuid: SessionUuid,
    pub user_name: String,
    pub user_image: Option<String>,
    pub activity: &'static str,
}
