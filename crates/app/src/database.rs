//! Database connection management

use sqlx::{PgPool, Postgres, Transaction, migrate::MigrateError, query};

/// Serialises writers that must observe a consistent view of one scheduling
/// bucket. Released automatically when the transaction ends.
const ADVISORY_XACT_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtext($1))";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction. Writers that need serialising call [`lock`] next.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Take the advisory lock for `key` inside an open transaction.
///
/// # Errors
///
/// Returns an error when the lock query fails.
pub async fn lock(tx: &mut Transaction<'_, Postgres>, key: &str) -> Result<(), sqlx::Error> {
    query(ADVISORY_XACT_LOCK_SQL)
        .bind(key)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
