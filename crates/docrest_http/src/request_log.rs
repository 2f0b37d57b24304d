//! Access logging middleware.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::time::Instant;

pub(crate) async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=http status={} method={method} path={path} code={} duration_ms={}",
        outcome(response.status()),
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

/// `status=` value of the access log line for a response code.
fn outcome(code: StatusCode) -> &'static str {
    if code.is_server_error() {
        "error"
    } else if code.is_client_error() {
        "rejected"
    } else {
        "ok"
    }
}
