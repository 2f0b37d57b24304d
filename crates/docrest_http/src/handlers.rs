//! Route handlers bridging axum extractors and resource controllers.

use crate::body::parse_body;
use crate::error::HttpError;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use docrest_core::{
    core_version, ping, ControllerRequest, ControllerResponse, DocumentRepository,
    ResourceController, ResponseBody,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Per-resource handler state.
pub(crate) struct ResourceState<R: DocumentRepository> {
    pub(crate) controller: ResourceController<R>,
    /// Public path of the resource collection, used for `Location` headers.
    pub(crate) base_path: String,
}

impl<R: DocumentRepository> ResourceState<R> {
    fn render(&self, response: ControllerResponse) -> Response {
        let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
        let mut rendered = match response.body {
            ResponseBody::Document(Some(fields)) => {
                (status, Json(Value::Object(fields))).into_response()
            }
            // Absent document: status only, no body.
            ResponseBody::Document(None) => status.into_response(),
            ResponseBody::Documents(documents) => (status, Json(documents)).into_response(),
            ResponseBody::Text(text) => (status, text).into_response(),
        };

        if let Some(id) = response.created_id {
            if let Ok(location) = HeaderValue::from_str(&format!("{}/{id}", self.base_path)) {
                rendered.headers_mut().insert(header::LOCATION, location);
            }
        }
        rendered
    }
}

type ResourceHandlerState<R> = State<Arc<ResourceState<R>>>;

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

pub(crate) async fn create<R: DocumentRepository + 'static>(
    State(state): ResourceHandlerState<R>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let request = ControllerRequest {
        id: None,
        body: parse_body(content_type(&headers), &body)?,
    };
    let response = state.controller.create(request).await?;
    Ok(state.render(response))
}

pub(crate) async fn read_one<R: DocumentRepository + 'static>(
    State(state): ResourceHandlerState<R>,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    let response = state
        .controller
        .read_one(ControllerRequest::new().with_id(id))
        .await?;
    Ok(state.render(response))
}

pub(crate) async fn read_all<R: DocumentRepository + 'static>(
    State(state): ResourceHandlerState<R>,
) -> Result<Response, HttpError> {
    let response = state.controller.read_all(ControllerRequest::new()).await?;
    Ok(state.render(response))
}

pub(crate) async fn update<R: DocumentRepository + 'static>(
    State(state): ResourceHandlerState<R>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    update_with(state, Some(id), &headers, &body).await
}

/// `PUT`/`PATCH` on the collection path: no id, answered with a 400.
pub(crate) async fn update_without_id<R: DocumentRepository + 'static>(
    State(state): ResourceHandlerState<R>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    update_with(state, None, &headers, &body).await
}

async fn update_with<R: DocumentRepository>(
    state: Arc<ResourceState<R>>,
    id: Option<String>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, HttpError> {
    let request = ControllerRequest {
        id,
        body: parse_body(content_type(headers), body)?,
    };
    let response = state.controller.update(request).await?;
    Ok(state.render(response))
}

pub(crate) async fn delete<R: DocumentRepository + 'static>(
    State(state): ResourceHandlerState<R>,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    let response = state
        .controller
        .delete(ControllerRequest::new().with_id(id))
        .await?;
    Ok(state.render(response))
}

pub(crate) async fn delete_without_id<R: DocumentRepository + 'static>(
    State(state): ResourceHandlerState<R>,
) -> Result<Response, HttpError> {
    let response = state.controller.delete(ControllerRequest::new()).await?;
    Ok(state.render(response))
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": ping(), "version": core_version() }))
}
