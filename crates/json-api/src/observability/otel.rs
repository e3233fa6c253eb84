//! OpenTelemetry tracer provider and trace context propagation.

use std::time::Duration;

use opentelemetry::{
    Context, KeyValue, global, propagation::Extractor, trace::TraceContextExt as _,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};
use salvo::http::{HeaderMap, HeaderName};

use crate::config::ServerConfig;

use super::ObservabilityError;

pub(super) fn build_tracer_provider(
    config: &ServerConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let settings = &config.observability;

    let resource = Resource::builder_empty()
        .with_service_name(settings.otel_service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new(
                "deployment.environment.name",
                settings.otel_deployment_environment.clone(),
            ),
        ])
        .build();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(settings.otel_exporter_otlp_endpoint.clone())
        .with_timeout(Duration::from_secs(
            settings.otel_exporter_otlp_timeout_seconds,
        ))
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
            settings.otel_trace_sample_ratio.clamp(0.0, 1.0),
        ))))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Remote parent carried in `traceparent`/`tracestate` headers, if valid.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| {
        // Start from an empty context so requests without trace headers become roots.
        let context = propagator.extract_with_context(&Context::new(), &Headers(headers));

        context
            .span()
            .span_context()
            .is_valid()
            .then_some(context)
    })
}

struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}
