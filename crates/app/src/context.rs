//! App Context

use std::{path::PathBuf, sync::Arc};

use jiff::tz::TimeZone;
use sqlx::migrate::MigrateError;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::{AuthService, AuthSettings, PgAuthService},
    database::{self, Db},
    domain::{
        messages::service::{MessagesService, PgMessagesService},
        promotions::service::{PgPromotionsService, PromotionsService},
        questions::service::{PgQuestionsService, QuestionsService},
        sessions::service::{PgSessionsService, SessionsService},
    },
    media::{LocalMediaStorage, MediaStorage},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),

    #[error("failed to prepare uploads directory")]
    Uploads(#[source] std::io::Error),
}

/// Everything needed to build the services.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,

    /// Apply pending migrations before serving.
    pub run_migrations: bool,

    /// Root directory for uploaded files.
    pub uploads_dir: PathBuf,

    /// Zone used for campaign dates and hours.
    pub schedule_time_zone: TimeZone,

    pub auth: AuthSettings,
}

#[derive(Clone)]
pub struct AppContext {
    pub promotions: Arc<dyn PromotionsService>,
    pub sessions: Arc<dyn SessionsService>,
    pub questions: Arc<dyn QuestionsService>,
    pub messages: Arc<dyn MessagesService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from settings.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting to the database, applying migrations
    /// or creating the uploads directory fails.
    pub async fn from_settings(settings: AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(&settings.database_url)
            .await
            .map_err(AppInitError::Database)?;

        if settings.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;

            info!("database migrations applied");
        }

        tokio::fs::create_dir_all(&settings.uploads_dir)
            .await
            .map_err(AppInitError::Uploads)?;

        let media: Arc<dyn MediaStorage> = Arc::new(LocalMediaStorage::new(settings.uploads_dir));

        Ok(Self {
            promotions: Arc::new(PgPromotionsService::new(
                Db::new(pool.clone()),
                Arc::clone(&media),
                settings.schedule_time_zone,
            )),
            sessions: Arc::new(PgSessionsService::new(pool.clone(), Arc::clone(&media))),
            questions: Arc::new(PgQuestionsService::new(pool.clone(), media)),
            messages: Arc::new(PgMessagesService::new(pool.clone())),
            auth: Arc::new(PgAuthService::new(pool, settings.auth)),
        })
    }
}
