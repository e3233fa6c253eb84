//! Message request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use umutoza_app::domain::messages::{data::NewMessage, records::MessageRecord};

/// Message Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,

    /// `unread` or `read`
    pub status: String,

    pub created_at: String,
    pub updated_at: String,
}

impl From<MessageRecord> for MessageResponse {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.uuid.into_uuid(),
            name: record.name,
            email: record.email,
            message: record.message,
            status: record.status.to_string(),
            created_at: record.created_at.to_string(),
            updated_at: record.updated_at.to_string(),
        }
    }
}

/// Contact Form Request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct MessageRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl From<MessageRequest> for NewMessage {
    fn from(request: MessageRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            message: request.message,
        }
    }
}
