//! Sessions Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::{
    domain::sessions::{
        data::{NewSession, SessionUpdate},
        errors::SessionsRepositoryError,
        records::{SessionRecord, SessionUuid},
    },
    labels::decode_label,
};

const FIND_SESSION_SQL: &str = include_str!("sql/find_session.sql");
const LIST_RECENT_SESSIONS_SQL: &str = include_str!("sql/list_recent_sessions.sql");
const CREATE_SESSION_SQL: &str = include_str!("sql/create_session.sql");
const RESUME_SESSION_SQL: &str = include_str!("sql/resume_session.sql");
const UPDATE_SESSION_SQL: &str = include_str!("sql/update_session.sql");
const DELETE_SESSION_SQL: &str = include_str!("sql/delete_session.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgSessionsRepository {
    pool: PgPool,
}

impl PgSessionsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for SessionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let progress = row.try_get::<i16, _>("progress")?;

        Ok(Self {
            uuid: SessionUuid::from_uuid(row.try_get("uuid")?),
            user_name: row.try_get("user_name")?,
            user_image: row.try_get("user_image")?,
            score: row.try_get("score")?,
            progress: u8::try_from(progress).map_err(|e| sqlx::Error::ColumnDecode {
                index: "progress".to_string(),
                source: Box::new(e),
            })?,
            status: decode_label(row, "status")?,
            activity: row.try_get("activity")?,
            start_time: row.try_get::<SqlxTimestamp, _>("start_time")?.to_jiff(),
            last_active: row.try_get::<SqlxTimestamp, _>("last_active")?.to_jiff(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

#[async_trait]
impl SessionsRepository for PgSessionsRepository {
    async fn find_session(
        &self,
        uuid: SessionUuid,
    ) -> Result<Option<SessionRecord>, SessionsRepositoryError> {
        Ok(query_as::<Postgres, SessionRecord>(FIND_SESSION_SQL)
            .bind(uuid.into_uuid())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_recent_sessions(
        &self,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, SessionsRepositoryError> {
        Ok(query_as::<Postgres, SessionRecord>(LIST_RECENT_SESSIONS_SQL)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_session(
        &self,
        session: NewSession,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsRepositoryError> {
        Ok(query_as::<Postgres, SessionRecord>(CREATE_SESSION_SQL)
            .bind(session.uuid.into_uuid())
            .bind(session.user_name)
            .bind(session.user_image)
            .bind(session.activity)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn resume_session(
        &self,
        uuid: SessionUuid,
        activity: &'static str,
        user_image: Option<String>,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsRepositoryError> {
        Ok(query_as::<Postgres, SessionRecord>(RESUME_SESSION_SQL)
            .bind(uuid.into_uuid())
            .bind(activity)
            .bind(user_image)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_session(
        &self,
        uuid: SessionUuid,
        update: SessionUpdate,
        last_active: Timestamp,
    ) -> Result<SessionRecord, SessionsRepositoryError> {
        Ok(query_as::<Postgres, SessionRecord>(UPDATE_SESSION_SQL)
            .bind(uuid.into_uuid())
            .bind(update.user_name)
            .bind(update.score)
            .bind(update.progress.map(i16::from))
            .bind(update.status.map(|status| status.as_str()))
            .bind(update.activity)
            .bind(SqlxTimestamp::from(last_active))
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_session(
        &self,
        uuid: SessionUuid,
    ) -> Result<SessionRecord, SessionsRepositoryError> {
        Ok(query_as::<Postgres, SessionRecord>(DELETE_SESSION_SQL)
            .bind(uuid.into_uuid())
            .fetch_one(&self.pool)
            .await?)
    }
}

#[automock]
#[async_trait]
pub(crate) trait SessionsRepository: Send + Sync {
    async fn find_session(
        &self,
        uuid: SessionUuid,
    ) -> Result<Option<SessionRecord>, SessionsRepositoryError>;

    /// Most recently active sessions first.
    async fn list_recent_sessions(
        &self,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, SessionsRepositoryError>;

    /// Insert an active session. Fails with `NameTaken` when another live
    /// session holds the name.
    async fn create_session(
        &self,
        session: NewSession,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsRepositoryError>;

    /// Reactivate a session for its returning holder, replacing the avatar
    /// when one is given.
    async fn resume_session(
        &self,
        uuid: SessionUuid,
        activity: &'static str,
        user_image: Option<String>,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionsRepositoryError>;

    /// Overwrite the supplied fields and stamp `last_active`.
    async fn update_session(
        &self,
        uuid: SessionUuid,
        update: SessionUpdate,
        last_active: Timestamp,
    ) -> Result<SessionRecord, SessionsRepositoryError>;

    async fn delete_session(
        &self,
        uuid: SessionUuid,
    ) -> Result<SessionRecord, SessionsRepositoryError>;
}
