use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use docrest_core::{
    CollectionRepository, ControllerOptions, DocumentData, DocumentRef, DocumentSnapshot,
    DocumentStore, InMemoryStore, ResourceController, StoreError, StoreResult,
};
use docrest_http::ApiRouter;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }

    fn location(&self) -> String {
        self.headers
            .get(header::LOCATION)
            .expect("location header")
            .to_str()
            .unwrap()
            .to_string()
    }
}

fn users_app(store: Arc<dyn DocumentStore>, options: ControllerOptions) -> Router {
    let repo = CollectionRepository::try_new(store, "users").unwrap();
    ApiRouter::new()
        .resource("users", ResourceController::with_options(repo, options))
        .build()
}

fn app() -> Router {
    users_app(Arc::new(InMemoryStore::new()), ControllerOptions::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> Reply {
    send_as(app, method, uri, "application/json", body).await
}

async fn send_as(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: &str,
    body: Option<&str>,
) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |raw| Body::from(raw.to_string())))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

#[tokio::test]
async fn post_then_get_roundtrip() {
    let app = app();

    let created = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(r#"{"firstname":"Ada"}"#),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.json(), json!({"firstname": "Ada"}));

    let location = created.location();
    assert!(location.starts_with("/api/v1/users/"));

    let fetched = send(&app, Method::GET, &location, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json(), json!({"firstname": "Ada"}));
}

#[tokio::test]
async fn post_without_body_is_bad_request() {
    let app = app();

    let reply = send(&app, Method::POST, "/api/v1/users", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({"error": "The body is empty or undefined"}));

    let reply = send(&app, Method::POST, "/api/v1/users", Some("[1,2,3]")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(&app, Method::POST, "/api/v1/users", Some("{broken")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn form_bodies_create_and_update_documents() {
    let app = app();
    let form = "application/x-www-form-urlencoded";

    let created = send_as(
        &app,
        Method::POST,
        "/api/v1/users",
        form,
        Some("firstname=Ada"),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.json(), json!({"firstname": "Ada"}));
    let location = created.location();

    let patched = send_as(
        &app,
        Method::PATCH,
        &location,
        form,
        Some("lastname=King+Lovelace"),
    )
    .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(
        patched.json(),
        json!({"firstname": "Ada", "lastname": "King Lovelace"})
    );

    let replaced = send_as(
        &app,
        Method::PUT,
        &location,
        form,
        Some("firstname=Augusta"),
    )
    .await;
    assert_eq!(replaced.status, StatusCode::OK);
    assert_eq!(replaced.json()["firstname"], json!("Augusta"));

    let empty = send_as(&app, Method::POST, "/api/v1/users", form, Some("")).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.json(), json!({"error": "The body is empty or undefined"}));
}

#[tokio::test]
async fn empty_collection_answers_no_content() {
    let app = app();

    let reply = send(&app, Method::GET, "/api/v1/users", None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn empty_collection_can_answer_empty_list() {
    let app = users_app(
        Arc::new(InMemoryStore::new()),
        ControllerOptions {
            empty_collection_is_error: false,
        },
    );

    let reply = send(&app, Method::GET, "/api/v1/users", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!([]));
}

#[tokio::test]
async fn list_returns_every_document() {
    let app = app();
    for name in ["Ada", "Alan", "Grace"] {
        let body = json!({ "firstname": name }).to_string();
        send(&app, Method::POST, "/api/v1/users", Some(&body)).await;
    }

    let reply = send(&app, Method::GET, "/api/v1/users", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let mut names: Vec<String> = reply
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["firstname"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, ["Ada", "Alan", "Grace"]);
}

#[tokio::test]
async fn get_missing_document_is_ok_without_body() {
    let app = app();

    let reply = send(&app, Method::GET, "/api/v1/users/ghost", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn patch_merges_fields() {
    let app = app();
    let created = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(r#"{"firstname":"Ada","email":"ada@old.example"}"#),
    )
    .await;
    let location = created.location();

    let reply = send(
        &app,
        Method::PATCH,
        &location,
        Some(r#"{"email":"ada@new.example"}"#),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        json!({"firstname": "Ada", "email": "ada@new.example"})
    );

    let reply = send(&app, Method::PUT, &location, Some(r#"{"lastname":"Lovelace"}"#)).await;
    assert_eq!(reply.json()["lastname"], json!("Lovelace"));
}

#[tokio::test]
async fn put_on_missing_document_changes_nothing() {
    let app = app();

    let reply = send(
        &app,
        Method::PUT,
        "/api/v1/users/ghost",
        Some(r#"{"firstname":"Nobody"}"#),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.is_empty());

    let list = send(&app, Method::GET, "/api/v1/users", None).await;
    assert_eq!(list.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn update_and_delete_without_id_are_bad_requests() {
    let app = app();

    let reply = send(&app, Method::PUT, "/api/v1/users", Some(r#"{"a":1}"#)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({"error": "The id was undefined"}));

    let reply = send(&app, Method::PATCH, "/api/v1/users/ada", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({"error": "The body is empty or undefined"}));

    let reply = send(&app, Method::DELETE, "/api/v1/users", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json(), json!({"error": "The id was undefined"}));
}

#[tokio::test]
async fn delete_confirms_and_is_idempotent() {
    let app = app();
    let created = send(&app, Method::POST, "/api/v1/users", Some(r#"{"firstname":"Ada"}"#)).await;
    let location = created.location();

    let reply = send(&app, Method::DELETE, &location, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.text(), "The object was deleted.");

    let reply = send(&app, Method::DELETE, &location, None).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(&app, Method::GET, &location, None).await;
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn health_reports_pong() {
    let reply = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["status"], json!("pong"));
}

#[tokio::test]
async fn resources_are_mounted_independently() {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let users = CollectionRepository::try_new(Arc::clone(&store), "users").unwrap();
    let teams = CollectionRepository::try_new(store, "teams").unwrap();
    let app = ApiRouter::with_prefix("/api/v2/")
        .resource("users", ResourceController::new(users))
        .resource("teams", ResourceController::new(teams))
        .build();

    let created = send(&app, Method::POST, "/api/v2/teams", Some(r#"{"name":"core"}"#)).await;
    assert!(created.location().starts_with("/api/v2/teams/"));

    let users = send(&app, Method::GET, "/api/v2/users", None).await;
    assert_eq!(users.status, StatusCode::NO_CONTENT);
    let teams = send(&app, Method::GET, "/api/v2/teams", None).await;
    assert_eq!(teams.json(), json!([{"name": "core"}]));
}

/// Store that fails every call with a detailed cause.
struct UnavailableStore;

fn unavailable() -> StoreError {
    StoreError::Db(schema_error())
}

fn schema_error() -> docrest_core::db::DbError {
    docrest_core::db::DbError::UnsupportedSchemaVersion {
        db_version: 7,
        latest_supported: 1,
    }
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn add(&self, _collection: &str, _data: DocumentData) -> StoreResult<DocumentRef> {
        Err(unavailable())
    }

    async fn get(&self, _reference: &DocumentRef) -> StoreResult<DocumentSnapshot> {
        Err(unavailable())
    }

    async fn list_documents(&self, _collection: &str) -> StoreResult<Vec<DocumentRef>> {
        Err(unavailable())
    }

    async fn update(&self, _reference: &DocumentRef, _data: DocumentData) -> StoreResult<()> {
        Err(unavailable())
    }

    async fn delete(&self, _reference: &DocumentRef) -> StoreResult<()> {
        Err(unavailable())
    }
}

#[tokio::test]
async fn store_failures_become_internal_errors_without_cause() {
    let app = users_app(Arc::new(UnavailableStore), ControllerOptions::default());

    let reply = send(&app, Method::POST, "/api/v1/users", Some(r#"{"a":1}"#)).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json(), json!({"error": "Could not create object"}));

    let reply = send(&app, Method::GET, "/api/v1/users", None).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!reply.text().contains("schema version"));
}
