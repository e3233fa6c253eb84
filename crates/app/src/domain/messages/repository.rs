//! Messages Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    domain::messages::{
        data::NewMessage,
        records::{MessageRecord, MessageUuid},
    },
    labels::decode_label,
};

const LIST_MESSAGES_SQL: &str = include_str!("sql/list_messages.sql");
const CREATE_MESSAGE_SQL: &str = include_str!("sql/create_message.sql");
const MARK_MESSAGE_READ_SQL: &str = include_str!("sql/mark_message_read.sql");
const DELETE_MESSAGE_SQL: &str = include_str!("sql/delete_message.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgMessagesRepository {
    pool: PgPool,
}

impl PgMessagesRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for MessageRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: MessageUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            message: row.try_get("message")?,
            status: decode_label(row, "status")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

#[async_trait]
impl MessagesRepository for PgMessagesRepository {
    async fn list_messages(&self) -> Result<Vec<MessageRecord>, sqlx::Error> {
        query_as::<Postgres, MessageRecord>(LIST_MESSAGES_SQL)
            .fetch_all(&self.pool)
            .await
    }

    async fn create_message(
        &self,
        uuid: MessageUuid,
        message: NewMessage,
    ) -> Result<MessageRecord, sqlx::Error> {
        query_as::<Postgres, MessageRecord>(CREATE_MESSAGE_SQL)
            .bind(uuid.into_uuid())
            .bind(message.name)
            .bind(message.email)
            .bind(message.message)
            .fetch_one(&self.pool)
            .await
    }

    async fn mark_message_read(&self, uuid: MessageUuid) -> Result<MessageRecord, sqlx::Error> {
        query_as::<Postgres, MessageRecord>(MARK_MESSAGE_READ_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(&self.pool)
            .await
    }

    async fn delete_message(&self, uuid: MessageUuid) -> Result<u64, sqlx::Error> {
        Ok(query(DELETE_MESSAGE_SQL)
            .bind(uuid.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected())
    }
}

#[automock]
#[async_trait]
pub(crate) trait MessagesRepository: Send + Sync {
    /// Every message, newest first.
    async fn list_messages(&self) -> Result<Vec<MessageRecord>, sqlx::Error>;

    async fn create_message(
        &self,
        uuid: MessageUuid,
        message: NewMessage,
    ) -> Result<MessageRecord, sqlx::Error>;

    async fn mark_message_read(&self, uuid: MessageUuid) -> Result<MessageRecord, sqlx::Error>;

    /// Delete a message, returning the number of rows removed.
    async fn delete_message(&self, uuid: MessageUuid) -> Result<u64, sqlx::Error>;
}
