//! Logs, traces and Prometheus metrics for the API.
//!
//! [`Observability::init`] runs once before the router is built; the
//! [`request_logging`] hoop then wraps every request in an `http.request` span.

use thiserror::Error;

mod init;
mod logging;
mod metrics;
mod otel;
mod request;
mod settings;

pub(crate) use init::Observability;
pub(crate) use metrics::{metrics_handler, record_api_error};
pub(crate) use request::request_logging;

#[derive(Debug, Error)]
pub(crate) enum ObservabilityError {
    #[error("could not build the OTLP span exporter: {0}")]
    OtlpExporter(#[from] opentelemetry_otlp::ExporterBuildError),

    #[error("a global tracing subscriber is already set: {0}")]
    TracingSubscriber(#[from] tracing_subscriber::util::TryInitError),
}
