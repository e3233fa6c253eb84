//! Server configuration module

use clap::Parser;
use jiff::{SignedDuration, tz::TimeZone};
use thiserror::Error;
use zeroize::Zeroizing;

use umutoza_app::{auth::AuthSettings, context::AppSettings};

use crate::config::{
    auth::AuthConfig,
    db::DatabaseConfig,
    media::MediaConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    schedule::ScheduleConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod auth;
pub(crate) mod db;
pub(crate) mod media;
pub(crate) mod observability;
pub(crate) mod schedule;
pub(crate) mod server;

/// Longest admin token lifetime accepted from configuration, one year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Configuration values that parse but cannot be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown schedule time zone \"{zone}\": {source}")]
    TimeZone {
        zone: String,
        #[source]
        source: jiff::Error,
    },

    #[error("token lifetime must be between 1 and {MAX_TOKEN_TTL_HOURS} hours, got {0}")]
    TokenTtl(i64),
}

/// Umutoza JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "umutoza-json", about = "Umutoza JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Admin token settings.
    #[command(flatten)]
    pub auth: AuthConfig,

    /// Uploaded media settings.
    #[command(flatten)]
    pub media: MediaConfig,

    /// Campaign schedule settings.
    #[command(flatten)]
    pub schedule: ScheduleConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings for building the application services.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown time zone or an out-of-range token
    /// lifetime.
    pub fn app_settings(&self) -> Result<AppSettings, SettingsError> {
        let zone = &self.schedule.schedule_time_zone;

        let schedule_time_zone =
            TimeZone::get(zone).map_err(|source| SettingsError::TimeZone {
                zone: zone.clone(),
                source,
            })?;

        let ttl_hours = self.auth.token_ttl_hours;

        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&ttl_hours) {
            return Err(SettingsError::TokenTtl(ttl_hours));
        }

        Ok(AppSettings {
            database_url: self.database.database_url.clone(),
            run_migrations: self.database.run_migrations,
            uploads_dir: self.media.uploads_dir.clone(),
            schedule_time_zone,
            auth: AuthSettings {
                pepper: Zeroizing::new(self.auth.token_pepper.clone()),
                token_ttl: SignedDuration::from_hours(ttl_hours),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_apply_when_only_required_values_are_given() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "umutoza-json",
            "--database-url",
            "postgres://localhost/umutoza",
            "--token-pepper",
            "pepper",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698", "default bind address");
        assert_eq!(config.auth.token_ttl_hours, 24, "default token lifetime");
        assert_eq!(config.schedule.schedule_time_zone, "UTC", "default schedule zone");
        assert!(!config.observability.otel_enabled, "tracing export is opt-in");
        assert_eq!(config.server.cors_allowed_origins, "*", "any origin by default");
        assert_eq!(
            config.server.shutdown_grace(),
            Some(std::time::Duration::from_secs(30)),
            "default drain window"
        );

        Ok(())
    }

    #[test]
    fn app_settings_carry_zone_and_token_lifetime() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "umutoza-json",
            "--database-url",
            "postgres://localhost/umutoza",
            "--token-pepper",
            "pepper",
            "--schedule-time-zone",
            "Africa/Kigali",
            "--token-ttl-hours",
            "8",
        ])?;

        let settings = config.app_settings()?;

        assert_eq!(
            settings.schedule_time_zone.iana_name(),
            Some("Africa/Kigali"),
            "zone"
        );
        assert_eq!(settings.auth.token_ttl, SignedDuration::from_hours(8), "ttl");
        assert_eq!(settings.auth.pepper.as_str(), "pepper", "pepper");

        Ok(())
    }

    #[test]
    fn unknown_zones_and_silly_lifetimes_are_rejected() -> TestResult {
        let base = [
            "umutoza-json",
            "--database-url",
            "postgres://localhost/umutoza",
            "--token-pepper",
            "pepper",
        ];

        let zone = ServerConfig::try_parse_from(
            base.iter().copied().chain(["--schedule-time-zone", "Mars/Olympus"]),
        )?;
        let ttl = ServerConfig::try_parse_from(
            base.iter().copied().chain(["--token-ttl-hours", "0"]),
        )?;

        assert!(
            matches!(zone.app_settings(), Err(SettingsError::TimeZone { .. })),
            "zone"
        );
        assert!(
            matches!(ttl.app_settings(), Err(SettingsError::TokenTtl(0))),
            "ttl"
        );

        Ok(())
    }
}
