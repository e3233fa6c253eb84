//! Messages Service

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;

use crate::domain::messages::{
    MessagesServiceError,
    data::NewMessage,
    records::{MessageRecord, MessageUuid},
    repository::{MessagesRepository, PgMessagesRepository},
};

#[derive(Clone)]
pub struct PgMessagesService {
    repository: Arc<dyn MessagesRepository>,
}

impl std::fmt::Debug for PgMessagesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgMessagesService").finish_non_exhaustive()
    }
}

impl PgMessagesService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_repository(Arc::new(PgMessagesRepository::new(pool)))
    }

    pub(crate) fn with_repository(repository: Arc<dyn MessagesRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl MessagesService for PgMessagesService {
    #[tracing::instrument(name = "messages.service.list_messages", skip(self), err)]
    async fn list_messages(&self) -> Result<Vec<MessageRecord>, MessagesServiceError> {
        Ok(self.repository.list_messages().await?)
    }

    #[tracing::instrument(name = "messages.service.submit_message", skip(self, message), err)]
    async fn submit_message(
        &self,
        message: NewMessage,
    ) -> Result<MessageRecord, MessagesServiceError> {
        let message = message.normalise()?;

        Ok(self
            .repository
            .create_message(MessageUuid::new(), message)
            .await?)
    }

    #[tracing::instrument(
        name = "messages.service.mark_read",
        skip(self),
        fields(message_uuid = %uuid),
        err
    )]
    async fn mark_read(&self, uuid: MessageUuid) -> Result<MessageRecord, MessagesServiceError> {
        Ok(self.repository.mark_message_read(uuid).await?)
    }

    #[tracing::instrument(
        name = "messages.service.delete_message",
        skip(self),
        fields(message_uuid = %uuid),
        err
    )]
    async fn delete_message(&self, uuid: MessageUuid) -> Result<(), MessagesServiceError> {
        let rows_affected = self.repository.delete_message(uuid).await?;

        if rows_affected == 0 {
            return Err(MessagesServiceError::NotFound);
        }

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait MessagesService: Send + Sync {
    /// The inbox, newest first.
    async fn list_messages(&self) -> Result<Vec<MessageRecord>, MessagesServiceError>;

    /// Store a contact form submission as unread.
    async fn submit_message(
        &self,
        message: NewMessage,
    ) -> Result<MessageRecord, MessagesServiceError>;

    async fn mark_read(&self, uuid: MessageUuid) -> Result<MessageRecord, MessagesServiceError>;

    async fn delete_message(&self, uuid: MessageUuid) -> Result<(), MessagesServiceError>;
}
