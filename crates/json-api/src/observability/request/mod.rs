//! Per-request span, request id, metrics and completion logging.

mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use umutoza_app::auth::AdminIdentity;

use super::{metrics, otel, settings};

/// Probed often enough that logging them would bury real traffic.
fn is_probe(path: &str) -> bool {
    matches!(path, "/metrics" | "/healthcheck")
}

/// Outcome of a finished request, logged once inside its span.
struct Completion<'a> {
    method: &'a str,
    path: &'a str,
    status: StatusCode,
    elapsed: Duration,
}

impl Completion<'_> {
    fn is_slow(&self, threshold_ms: u64) -> bool {
        self.elapsed > Duration::from_millis(threshold_ms)
    }

    fn log(&self, threshold_ms: u64) {
        let status = self.status.as_u16();
        let duration_ms = self.elapsed.as_millis();
        let (method, path) = (self.method, self.path);

        if self.status.is_server_error() {
            error!(status, duration_ms, method, path, "request failed");
        } else if self.status.is_client_error() {
            warn!(status, duration_ms, method, path, "request rejected");
        } else {
            info!(status, duration_ms, "request.completed");
        }

        if self.is_slow(threshold_ms) {
            warn!(duration_ms, threshold_ms, method, path, "slow request");
        }
    }
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if is_probe(req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();
    let _in_flight = metrics::InFlightRequestGuard::track();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let names = spans::request_span_name(&method, &path);

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %names.span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        route = %names.route,
        path = %path,
        remote_addr = %req.remote_addr(),
        admin = tracing::field::Empty,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    let request_settings = settings::current();

    if request_settings.continue_remote_traces
        && let Some(parent_context) = otel::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent_context)
    {
        warn!("failed to continue remote trace: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let completion = Completion {
        method: &method,
        path: &path,
        status: request_ids::response_status_or_ok(res.status_code),
        elapsed: started.elapsed(),
    };

    metrics::observe_request(
        &method,
        &names.route,
        completion.status.as_u16(),
        completion.elapsed.as_secs_f64(),
    );

    record_outcome(&span, depot, &completion);

    span.in_scope(|| completion.log(request_settings.slow_request_threshold_ms));
}

fn record_outcome(span: &Span, depot: &Depot, completion: &Completion<'_>) {
    // Set by the admin hoop once a bearer token checks out.
    if let Ok(admin) = depot.obtain::<AdminIdentity>() {
        span.record("admin", admin.username.as_str());
    }

    span.record("status", completion.status.as_u16());
    span.record("duration_ms", completion.elapsed.as_millis());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_are_not_logged() {
        assert!(is_probe("/healthcheck"), "healthcheck");
        assert!(is_probe("/metrics"), "metrics");
        assert!(!is_probe("/api/promotions/public"), "api traffic");
    }

    #[test]
    fn slowness_is_strictly_above_the_threshold() {
        let completion = Completion {
            method: "GET",
            path: "/api/sessions",
            status: StatusCode::OK,
            elapsed: Duration::from_millis(1_000),
        };

        assert!(!completion.is_slow(1_000), "at threshold");
        assert!(completion.is_slow(999), "above threshold");
    }
}
