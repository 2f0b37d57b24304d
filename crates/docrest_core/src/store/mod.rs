//! Document store contract and bundled implementations.
//!
//! # Responsibility
//! - Define the client surface the repository layer talks to: references,
//!   snapshot reads, add/update/delete and collection listing.
//! - Provide in-memory and SQLite-backed stores with the same semantics.
//!
//! # Invariants
//! - `update` merges top-level fields and fails with `NotFound` when the
//!   document is absent.
//! - `delete` of an absent document is a no-op.
//! - `get` of an absent document returns a snapshot without data.
//! - Ids assigned by `add` are unique within the store.

use crate::db::DbError;
use crate::model::document::{DocumentData, DocumentRef, DocumentSnapshot, NameError};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure raised by a document store call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error("document not found: {0}")]
    NotFound(DocumentRef),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("failed to encode document data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupt document `{reference}`: {message}")]
    CorruptDocument {
        reference: DocumentRef,
        message: String,
    },
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Client interface of a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Builds a reference to `collection/id` without touching storage.
    fn doc(&self, collection: &str, id: &str) -> StoreResult<DocumentRef> {
        Ok(DocumentRef::new(collection, id)?)
    }

    /// Adds a document with a store-assigned id.
    async fn add(&self, collection: &str, data: DocumentData) -> StoreResult<DocumentRef>;

    /// Reads the current state of a document.
    async fn get(&self, reference: &DocumentRef) -> StoreResult<DocumentSnapshot>;

    /// References to every document in the collection, in store order.
    async fn list_documents(&self, collection: &str) -> StoreResult<Vec<DocumentRef>>;

    /// Merges `data` into an existing document.
    async fn update(&self, reference: &DocumentRef, data: DocumentData) -> StoreResult<()>;

    /// Removes a document if present.
    async fn delete(&self, reference: &DocumentRef) -> StoreResult<()>;
}

/// Generates a store-assigned document id.
pub(crate) fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}
