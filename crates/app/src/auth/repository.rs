//! Auth repository.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::auth::{
    AuthRepositoryError,
    models::{
        AdminCredentials, AdminRecord, AdminSession, AdminSessionUuid, AdminUuid, NewAdmin,
        NewAdminSession,
    },
};

const FIND_ADMIN_BY_USERNAME_SQL: &str = include_str!("sql/find_admin_by_username.sql");
const CREATE_ADMIN_SQL: &str = include_str!("sql/create_admin.sql");
const CREATE_ADMIN_SESSION_SQL: &str = include_str!("sql/create_admin_session.sql");
const TOUCH_ADMIN_SESSION_SQL: &str = include_str!("sql/touch_admin_session.sql");
const DELETE_EXPIRED_ADMIN_SESSIONS_SQL: &str =
    include_str!("sql/delete_expired_admin_sessions.sql");

#[derive(Debug, Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for AdminRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AdminUuid::from_uuid(row.try_get("uuid")?),
            username: row.try_get("username")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AdminCredentials {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AdminUuid::from_uuid(row.try_get("uuid")?),
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AdminSession {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            admin_uuid: AdminUuid::from_uuid(row.try_get("admin_uuid")?),
            username: row.try_get("username")?,
            secret_hash: row.try_get("secret_hash")?,
        })
    }
}

#[async_trait]
impl AuthRepository for PgAuthRepository {
    async fn find_admin_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, AuthRepositoryError> {
        query_as::<Postgres, AdminCredentials>(FIND_ADMIN_BY_USERNAME_SQL)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(AuthRepositoryError::from)
    }

    async fn create_admin(&self, admin: NewAdmin) -> Result<AdminRecord, AuthRepositoryError> {
        query_as::<Postgres, AdminRecord>(CREATE_ADMIN_SQL)
            .bind(admin.uuid.into_uuid())
            .bind(admin.username)
            .bind(admin.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(AuthRepositoryError::from)
    }

    async fn create_admin_session(
        &self,
        session: NewAdminSession,
    ) -> Result<(), AuthRepositoryError> {
        query(CREATE_ADMIN_SESSION_SQL)
            .bind(session.uuid.into_uuid())
            .bind(session.admin_uuid.into_uuid())
            .bind(session.secret_hash)
            .bind(SqlxTimestamp::from(session.expires_at))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn touch_admin_session(
        &self,
        session: AdminSessionUuid,
    ) -> Result<Option<AdminSession>, AuthRepositoryError> {
        query_as::<Postgres, AdminSession>(TOUCH_ADMIN_SESSION_SQL)
            .bind(session.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(AuthRepositoryError::from)
    }

    async fn delete_expired_admin_sessions(&self) -> Result<u64, AuthRepositoryError> {
        Ok(query(DELETE_EXPIRED_ADMIN_SESSIONS_SQL)
            .execute(&self.pool)
            .await?
            .rows_affected())
    }
}

#[automock]
#[async_trait]
pub(crate) trait AuthRepository: Send + Sync {
    async fn find_admin_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, AuthRepositoryError>;

    async fn create_admin(&self, admin: NewAdmin) -> Result<AdminRecord, AuthRepositoryError>;

    async fn create_admin_session(
        &self,
        session: NewAdminSession,
    ) -> Result<(), AuthRepositoryError>;

    /// Load an unexpired session and record that it was just used.
    async fn touch_admin_session(
        &self,
        session: AdminSessionUuid,
    ) -> Result<Option<AdminSession>, AuthRepositoryError>;

    async fn delete_expired_admin_sessions(&self) -> Result<u64, AuthRepositoryError>;
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use testresult::TestResult;

    use crate::{
        auth::{AuthService, AuthServiceError},
        test::TestContext,
    };

    use super::*;

    #[tokio::test]
    async fn usernames_are_unique_regardless_of_case() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.auth.create_admin("Root", "first").await?;

        let duplicate = ctx.auth.create_admin("ROOT", "second").await;

        assert!(
            matches!(duplicate, Err(AuthServiceError::AlreadyExists)),
            "expected AlreadyExists, got {duplicate:?}"
        );

        let repository = PgAuthRepository::new(ctx.db.pool().clone());
        let found = repository.find_admin_by_username("root").await?;

        assert!(
            found.is_some_and(|admin| admin.username == "Root"),
            "lookup ignores case"
        );

        Ok(())
    }

    #[tokio::test]
    async fn login_session_authenticates_until_it_expires() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.auth.create_admin("keeper", "hunter2").await?;

        let issued = ctx.auth.login("KEEPER", "hunter2", Timestamp::now()).await?;
        let identity = ctx.auth.authenticate_bearer(&issued.token).await?;

        assert_eq!(identity.username, "keeper", "session resolves to its admin");

        let stale = ctx
            .auth
            .login(
                "keeper",
                "hunter2",
                Timestamp::now() - SignedDuration::from_hours(48),
            )
            .await?;

        let rejected = ctx.auth.authenticate_bearer(&stale.token).await;

        assert!(
            matches!(rejected, Err(AuthServiceError::NotFound)),
            "expired session is refused, got {rejected:?}"
        );

        let remaining: i64 = sqlx::query_scalar("SELECT count(*) FROM admin_sessions")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(remaining, 1, "login purged the expired session");

        Ok(())
    }
}
