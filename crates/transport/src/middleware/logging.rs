use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, instrument, Instrument};
use uuid::Uuid;

pub fn get_tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Request-id + duration logging, layered on top of `TraceLayer`'s
/// span-per-request.
#[instrument(skip(request, next))]
pub async fn logging_middleware(mut request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = request.method().clone();
    let uri = request.uri().clone();

    request.headers_mut().insert("x-request-id", request_id.parse().unwrap());

    let span = info_span!("http_request", request_id = %request_id, method = %method, uri = %uri);
    let response = next.run(request).instrument(span).await;

    let duration = start_time.elapsed();
    let status = response.status();
    if status.is_server_error() {
        error!(request_id = %request_id, %status, duration_ms = %duration.as_millis(), "request failed with server error");
    } else if status.is_client_error() {
        error!(request_id = %request_id, %status, duration_ms = %duration.as_millis(), "request failed with client error");
    } else {
        info!(request_id = %request_id, %status, duration_ms = %duration.as_millis(), "request completed");
    }

    response
}
