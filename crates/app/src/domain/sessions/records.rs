//! Session Records

use jiff::Timestamp;

use crate::{domain::sessions::presence, labels::labelled_enum, uuids::TypedUuid};

/// Session UUID
pub type SessionUuid = TypedUuid<SessionRecord>;

labelled_enum! {
    /// Where a quiz attempt stands.
    pub enum SessionStatus ("session status") {
        Active => "active",
        Pending => "pending",
        Completed => "completed",
    }
}

/// Session Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub uuid: SessionUuid,
    pub user_name: String,
    pub user_image: Option<String>,
    pub score: i32,

    /// Percentage through the attempt, `0..=100`.
    pub progress: u8,

    pub status: SessionStatus,

    /// Free-text label shown to admins.
    pub activity: String,

    pub start_time: Timestamp,
    pub last_active: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SessionRecord {
    #[must_use]
    pub fn is_online(&self, now: Timestamp) -> bool {
        presence::is_online(self.last_active, now)
    }
}
