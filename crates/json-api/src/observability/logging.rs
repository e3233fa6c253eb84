//! Log subscriber assembly.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{ServerConfig, observability::LogFormat};

use super::ObservabilityError;

/// Dependencies whose info-level output drowns out request logs.
const QUIET_DEPENDENCIES: &[&str] = &[
    "h2=warn",
    "hyper=warn",
    "opentelemetry=warn",
    "sqlx=warn",
    "tonic=warn",
    "tower=warn",
];

type FmtLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Filter used when `RUST_LOG` is unset: `level` for our crates, warn for the noisy ones.
fn default_directives(level: &str) -> String {
    std::iter::once(level)
        .chain(QUIET_DEPENDENCIES.iter().copied())
        .collect::<Vec<_>>()
        .join(",")
}

fn fmt_layer(format: LogFormat) -> FmtLayer {
    let layer = tracing_subscriber::fmt::layer().with_target(true);

    match format {
        LogFormat::Compact => layer
            .compact()
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    }
}

pub(super) fn init_subscriber(
    config: &ServerConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_unset| EnvFilter::new(default_directives(&config.logging.log_level)));

    let otel = tracer_provider.map(|provider| {
        tracing_opentelemetry::layer()
            .with_tracer(provider.tracer(config.observability.otel_service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(fmt_layer(config.logging.log_format))
        .with(filter)
        .with(otel)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_lead_with_the_configured_level() {
        let directives = default_directives("debug");

        assert!(directives.starts_with("debug,"), "level first: {directives}");
        assert!(directives.contains("sqlx=warn"), "database driver muted");
        assert!(EnvFilter::try_new(&directives).is_ok(), "parses as a filter");
    }
}
