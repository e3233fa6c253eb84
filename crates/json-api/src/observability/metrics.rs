//! Prometheus metrics and the `/metrics` exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const DURATION_BUCKETS: [f64; 13] = [
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug)]
struct ApiMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    errors_total: IntCounterVec,
}

static API_METRICS: OnceLock<Option<ApiMetrics>> = OnceLock::new();

fn metrics() -> Option<&'static ApiMetrics> {
    API_METRICS
        .get_or_init(|| {
            ApiMetrics::build()
                .inspect_err(|source| error!("metrics disabled, failed to build registry: {source}"))
                .ok()
        })
        .as_ref()
}

fn registered<C>(registry: &Registry, collector: C) -> prometheus::Result<C>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;

    Ok(collector)
}

impl ApiMetrics {
    fn build() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests_total = registered(
            &registry,
            IntCounterVec::new(
                Opts::new(
                    "umutoza_json_http_requests_total",
                    "HTTP requests by method, route and status.",
                ),
                &["method", "route", "status_class", "status_code"],
            )?,
        )?;

        let request_duration_seconds = registered(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "umutoza_json_http_request_duration_seconds",
                    "HTTP request latency by method and route.",
                )
                .buckets(DURATION_BUCKETS.to_vec()),
                &["method", "route"],
            )?,
        )?;

        let requests_in_flight = registered(
            &registry,
            IntGauge::new(
                "umutoza_json_http_requests_in_flight",
                "Requests currently being handled.",
            )?,
        )?;

        let errors_total = registered(
            &registry,
            IntCounterVec::new(
                Opts::new(
                    "umutoza_json_api_errors_total",
                    "Error responses by machine-readable error code.",
                ),
                &["code"],
            )?,
        )?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            requests_in_flight,
            errors_total,
        })
    }
}

/// Holds the in-flight gauge up for the lifetime of a request.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard(Option<&'static IntGauge>);

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let gauge = metrics().map(|metrics| &metrics.requests_in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self(gauge)
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.0 {
            gauge.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_code_label = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class(status_code), status_code_label.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count an error response by its `error` code, e.g. `capacity_exceeded`.
pub(crate) fn record_api_error(code: &str) {
    if let Some(metrics) = metrics() {
        metrics.errors_total.with_label_values(&[code]).inc();
    }
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::SERVICE_UNAVAILABLE);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[test]
    fn status_codes_fold_into_classes() {
        assert_eq!(status_class(201), "2xx", "created");
        assert_eq!(status_class(409), "4xx", "conflict");
        assert_eq!(status_class(503), "5xx", "unavailable");
        assert_eq!(status_class(42), "other", "nonsense");
    }

    #[tokio::test]
    async fn metrics_endpoint_exposes_request_and_error_counters() -> TestResult {
        observe_request("POST", "/api/promotions/public/selection", 200, 0.042);
        record_api_error("name_taken");

        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        let body = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await?;

        assert!(
            body.contains("umutoza_json_http_requests_total"),
            "requests counter present"
        );
        assert!(
            body.contains("umutoza_json_http_request_duration_seconds"),
            "latency histogram present"
        );
        assert!(
            body.contains("umutoza_json_http_requests_in_flight"),
            "in-flight gauge present"
        );
        assert!(
            body.contains(r#"umutoza_json_api_errors_total{code="name_taken"}"#),
            "error counter labelled by code"
        );

        Ok(())
    }
}
