//! Generic CRUD controller for one resource type.
//!
//! # Responsibility
//! - Check minimal request shape (body and id presence).
//! - Invoke the repository and resolve returned references into data.
//!
//! # Invariants
//! - Only validation (400) and empty-collection (204) errors originate here;
//!   repository failures are forwarded unchanged.
//! - `read_all` keeps the repository's reference order.

use crate::model::document::{DocumentData, DocumentRef};
use crate::repo::collection_repo::{DocumentRepository, RepoError};
use futures::future::try_join_all;
use log::debug;
use thiserror::Error;

pub const BODY_MISSING_MESSAGE: &str = "The body is empty or undefined";
pub const ID_MISSING_MESSAGE: &str = "The id was undefined";
pub const EMPTY_COLLECTION_MESSAGE: &str = "The list of entities was empty";
pub const DELETED_MESSAGE: &str = "The object was deleted.";

/// Request shape seen by the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerRequest {
    /// Path id; blank values are treated as absent.
    pub id: Option<String>,
    /// Parsed JSON object body.
    pub body: Option<DocumentData>,
}

impl ControllerRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: DocumentData) -> Self {
        self.body = Some(body);
        self
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Successful response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// One document's fields; `None` when the document does not exist.
    Document(Option<DocumentData>),
    Documents(Vec<DocumentData>),
    Text(String),
}

/// Successful controller outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerResponse {
    pub status: u16,
    pub body: ResponseBody,
    /// Id of a newly created document.
    pub created_id: Option<String>,
}

impl ControllerResponse {
    fn ok(body: ResponseBody) -> Self {
        Self {
            status: 200,
            body,
            created_id: None,
        }
    }
}

/// Error forwarded to the transport's error handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NoContent(String),
    #[error(transparent)]
    Repository(#[from] RepoError),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NoContent(_) => 204,
            Self::Repository(_) => 500,
        }
    }
}

pub type ControllerResult = Result<ControllerResponse, ApiError>;

/// Behavior switches for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Report an empty collection through the error path (204) instead of
    /// returning an empty list.
    pub empty_collection_is_error: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            empty_collection_is_error: true,
        }
    }
}

/// CRUD controller over an injected repository.
pub struct ResourceController<R: DocumentRepository> {
    repo: R,
    options: ControllerOptions,
}

impl<R: DocumentRepository> ResourceController<R> {
    /// Creates a controller with default options.
    pub fn new(repo: R) -> Self {
        Self::with_options(repo, ControllerOptions::default())
    }

    pub fn with_options(repo: R, options: ControllerOptions) -> Self {
        Self { repo, options }
    }

    /// Creates a document from the body and returns its stored fields.
    pub async fn create(&self, request: ControllerRequest) -> ControllerResult {
        let body = request
            .body
            .ok_or_else(|| ApiError::BadRequest(BODY_MISSING_MESSAGE.to_string()))?;

        let reference = self.repo.create(body).await?;
        let data = self.resolve(&reference).await?;

        Ok(ControllerResponse {
            created_id: Some(reference.id().to_string()),
            ..ControllerResponse::ok(ResponseBody::Document(data))
        })
    }

    /// Returns one document's fields, or no data when it does not exist.
    pub async fn read_one(&self, request: ControllerRequest) -> ControllerResult {
        let id = request
            .id()
            .ok_or_else(|| ApiError::BadRequest(ID_MISSING_MESSAGE.to_string()))?;

        let reference = self.repo.read_one(id).await?;
        let data = self.resolve(&reference).await?;
        Ok(ControllerResponse::ok(ResponseBody::Document(data)))
    }

    /// Returns the fields of every document in the collection.
    ///
    /// Snapshots are fetched concurrently; documents removed between listing
    /// and fetching are left out. A listing that resolves to no documents is
    /// treated like an empty collection.
    pub async fn read_all(&self, _request: ControllerRequest) -> ControllerResult {
        let references = self.repo.read_all().await?;
        if references.is_empty() && self.options.empty_collection_is_error {
            return Err(ApiError::NoContent(EMPTY_COLLECTION_MESSAGE.to_string()));
        }

        let snapshots =
            try_join_all(references.iter().map(|reference| self.repo.snapshot(reference))).await?;
        let documents: Vec<DocumentData> = snapshots
            .into_iter()
            .filter_map(|snapshot| snapshot.into_data())
            .collect();

        debug!(
            "event=controller_read_all module=controller status=ok collection={} listed={} returned={}",
            self.repo.collection(),
            references.len(),
            documents.len()
        );
        if documents.is_empty() && self.options.empty_collection_is_error {
            return Err(ApiError::NoContent(EMPTY_COLLECTION_MESSAGE.to_string()));
        }
        Ok(ControllerResponse::ok(ResponseBody::Documents(documents)))
    }

    /// Merges the body into the document and returns the resulting fields.
    pub async fn update(&self, request: ControllerRequest) -> ControllerResult {
        let id = request.id().map(str::to_string);
        let body = request
            .body
            .ok_or_else(|| ApiError::BadRequest(BODY_MISSING_MESSAGE.to_string()))?;
        let id = id.ok_or_else(|| ApiError::BadRequest(ID_MISSING_MESSAGE.to_string()))?;

        let reference = self.repo.update(&id, body).await?;
        let data = self.resolve(&reference).await?;
        Ok(ControllerResponse::ok(ResponseBody::Document(data)))
    }

    /// Deletes the document and confirms with a fixed message.
    pub async fn delete(&self, request: ControllerRequest) -> ControllerResult {
        let id = request
            .id()
            .ok_or_else(|| ApiError::BadRequest(ID_MISSING_MESSAGE.to_string()))?;

        self.repo.delete(id).await?;
        Ok(ControllerResponse::ok(ResponseBody::Text(DELETED_MESSAGE.to_string())))
    }

    async fn resolve(&self, reference: &DocumentRef) -> Result<Option<DocumentData>, RepoError> {
        Ok(self.repo.snapshot(reference).await?.into_data())
    }
}
