//! Request-path settings fixed at startup.

use std::sync::OnceLock;

use tracing::warn;

use crate::config::ServerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RequestSettings {
    pub(super) slow_request_threshold_ms: u64,

    /// Only meaningful with export on, which installs the propagator.
    pub(super) continue_remote_traces: bool,
}

const DEFAULTS: RequestSettings = RequestSettings {
    slow_request_threshold_ms: 1_000,
    continue_remote_traces: false,
};

static REQUEST_SETTINGS: OnceLock<RequestSettings> = OnceLock::new();

impl From<&ServerConfig> for RequestSettings {
    fn from(config: &ServerConfig) -> Self {
        let observability = &config.observability;

        Self {
            slow_request_threshold_ms: config.logging.slow_request_threshold_ms,
            continue_remote_traces: observability.otel_enabled
                && observability.otel_parent_propagation_enabled,
        }
    }
}

pub(super) fn install(config: &ServerConfig) {
    if REQUEST_SETTINGS.set(config.into()).is_err() {
        warn!("request settings were already installed, keeping the first");
    }
}

/// Installed settings, or the defaults before startup has run.
pub(super) fn current() -> RequestSettings {
    REQUEST_SETTINGS.get().copied().unwrap_or(DEFAULTS)
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use testresult::TestResult;

    use super::*;

    fn parse(extra: &[&str]) -> Result<ServerConfig, clap::Error> {
        ServerConfig::try_parse_from(
            [
                "umutoza-json",
                "--database-url",
                "postgres://localhost/umutoza",
                "--token-pepper",
                "pepper",
            ]
            .into_iter()
            .chain(extra.iter().copied()),
        )
    }

    #[test]
    fn remote_traces_need_export_enabled() -> TestResult {
        let propagation_only = parse(&["--otel-parent-propagation-enabled"])?;
        let both = parse(&["--otel-enabled", "--otel-parent-propagation-enabled"])?;

        assert!(
            !RequestSettings::from(&propagation_only).continue_remote_traces,
            "no propagator without export"
        );
        assert!(
            RequestSettings::from(&both).continue_remote_traces,
            "export plus propagation"
        );

        Ok(())
    }

    #[test]
    fn slow_threshold_comes_from_logging_config() -> TestResult {
        let config = parse(&["--slow-request-threshold-ms", "250"])?;

        assert_eq!(
            RequestSettings::from(&config).slow_request_threshold_ms,
            250,
            "threshold"
        );

        Ok(())
    }
}
