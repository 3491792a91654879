//! Request-level logging, request IDs and metrics.

mod request_ids;
mod spans;

use std::{
    sync::OnceLock,
    time::{Duration, Instant},
};

use salvo::{
    Request, handler,
    http::{ResBody, StatusCode},
    prelude::{Depot, FlowCtrl, Response, StatusError},
};
use tracing::Instrument as _;
use tracing::{error, info, warn};

use super::metrics;

pub(crate) const REQUEST_ID_DEPOT_KEY: &str = "request_id";

const DEFAULT_SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

static SLOW_REQUEST_THRESHOLD: OnceLock<Duration> = OnceLock::new();

/// Requests slower than `threshold` are logged as warnings. Only the first call wins.
pub(crate) fn set_slow_request_threshold(threshold: Duration) {
    let _already_set = SLOW_REQUEST_THRESHOLD.set(threshold);
}

fn slow_request_threshold() -> Duration {
    SLOW_REQUEST_THRESHOLD
        .get()
        .copied()
        .unwrap_or(DEFAULT_SLOW_REQUEST_THRESHOLD)
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if req.uri().path() == "/metrics" {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let remote_addr = req.remote_addr().to_string();
    let route = spans::route_label(&path);
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
        remote_addr = %remote_addr,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let duration = started.elapsed();
    let status = request_ids::response_status_or_ok(res.status_code);
    let duration_ms = duration.as_millis();
    let threshold = slow_request_threshold();

    if status.is_server_error() {
        attach_request_id(res, status, &request_id);
    }

    metrics::observe_request(&method, &route, status.as_u16(), duration.as_secs_f64());

    span.record("status", status.as_u16());
    span.record("duration_ms", duration_ms);

    // The raw path is logged only on failures; it can carry identifiers.
    span.in_scope(|| {
        info!(status = status.as_u16(), duration_ms, "request.completed");

        if status.is_server_error() {
            error!(
                status = status.as_u16(),
                method = %method,
                path = %path,
                request_id = %request_id,
                "server error response"
            );
        } else if status.is_client_error() {
            warn!(
                status = status.as_u16(),
                method = %method,
                path = %path,
                request_id = %request_id,
                "client error response"
            );
        }

        if duration > threshold {
            warn!(
                method = %method,
                route = %route,
                request_id = %request_id,
                duration_ms,
                threshold_ms = threshold.as_millis(),
                "slow request detected"
            );
        }
    });
}

/// Give opaque server errors something a client can quote back to support.
///
/// salvo's default catcher only renders `detail` when `SALVO_STATUS_ERROR` opts in,
/// so the id goes into the always-rendered `brief` as well.
fn attach_request_id(res: &mut Response, status: StatusCode, request_id: &str) {
    let suffix = format!("request_id: {request_id}");

    match &mut res.body {
        ResBody::Error(status_error) => {
            if !status_error.brief.contains(&suffix) {
                status_error.brief = format!("{} ({suffix})", status_error.brief);
            }

            if status_error.detail.is_none() {
                status_error.detail = Some(suffix);
            }
        }
        ResBody::None => {
            let status_error = StatusError::from_code(status)
                .unwrap_or_else(StatusError::internal_server_error);
            let brief = format!("{} ({suffix})", status_error.brief);

            res.body = ResBody::Error(status_error.brief(brief).detail(suffix));
        }
        _ => {}
    }
}
