//! Error-handling hook: maps controller errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docrest_core::ApiError;
use log::{error, warn};
use serde_json::json;

/// Error returned by handlers; rendering it is the single place where error
/// statuses and bodies are decided.
#[derive(Debug)]
pub struct HttpError(pub ApiError);

impl From<ApiError> for HttpError {
    fn from(value: ApiError) -> Self {
        Self(value)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &self.0 {
            ApiError::NoContent(_) => StatusCode::NO_CONTENT.into_response(),
            ApiError::BadRequest(message) => {
                warn!(
                    "event=http_error module=http status=rejected code={} error={message}",
                    status.as_u16()
                );
                (status, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Repository(err) => {
                let cause = err
                    .store_error()
                    .map_or_else(String::new, ToString::to_string);
                error!(
                    "event=http_error module=http status=error code={} error_code={} error={err} cause={cause}",
                    status.as_u16(),
                    err.code()
                );
                (status, Json(json!({ "error": err.to_string() }))).into_response()
            }
        }
    }
}
