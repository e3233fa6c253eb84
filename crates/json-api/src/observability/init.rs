//! Startup and teardown of logging and trace export.

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace::SdkTracerProvider};
use tracing::{error, info};

use crate::config::ServerConfig;

use super::{ObservabilityError, logging, otel, settings};

/// Keeps the tracer provider alive until [`Observability::shutdown`] flushes it.
#[derive(Debug)]
pub(crate) struct Observability {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Observability {
    pub(crate) fn init(config: &ServerConfig) -> Result<Self, ObservabilityError> {
        let tracer_provider = config
            .observability
            .otel_enabled
            .then(|| {
                global::set_text_map_propagator(TraceContextPropagator::new());

                otel::build_tracer_provider(config)
            })
            .transpose()?;

        logging::init_subscriber(config, tracer_provider.as_ref())?;
        settings::install(config);

        if tracer_provider.is_some() {
            info!(
                endpoint = %config.observability.otel_exporter_otlp_endpoint,
                "exporting traces over OTLP"
            );
        }

        Ok(Self { tracer_provider })
    }

    pub(crate) fn shutdown(self) {
        if let Some(provider) = self.tracer_provider
            && let Err(source) = provider.shutdown()
        {
            error!("failed to flush traces on shutdown: {source}");
        }
    }
}
