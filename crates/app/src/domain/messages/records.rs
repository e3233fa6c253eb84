//! Message Records

use jiff::Timestamp;

use crate::{labels::labelled_enum, uuids::TypedUuid};

/// Message UUID
pub type MessageUuid = TypedUuid<MessageRecord>;

labelled_enum! {
    pub enum MessageStatus ("message status") {
        Unread => "unread",
        Read => "read",
    }
}

/// Message Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub uuid: MessageUuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
