//! Collection repository contract and store-backed implementation.
//!
//! # Responsibility
//! - Translate resource-agnostic CRUD intents into calls against one named
//!   collection.
//! - Return document references; resolving them to data is the caller's call.
//!
//! # Invariants
//! - Operations never retry and never recover a store failure.
//! - Every failure is reported as the operation's own variant with the store
//!   error kept as `source()`.
//! - `update` of an absent document writes nothing and still returns its
//!   reference.

use crate::model::document::{
    validate_collection_name, DocumentData, DocumentRef, DocumentSnapshot, NameError,
};
use crate::store::{DocumentStore, StoreError};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository failure, tagged with the operation that failed.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    InvalidCollection(NameError),
    #[error("Could not create object")]
    Create(#[source] StoreError),
    #[error("Could not read object")]
    Read(#[source] StoreError),
    #[error("Could not read all objects")]
    ReadAll(#[source] StoreError),
    #[error("Could not update object")]
    Update(#[source] StoreError),
    #[error("Could not remove object")]
    Delete(#[source] StoreError),
    #[error("Could not resolve object")]
    Snapshot(#[source] StoreError),
}

impl RepoError {
    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCollection(_) => "invalid_collection",
            Self::Create(_) => "create_failed",
            Self::Read(_) => "read_failed",
            Self::ReadAll(_) => "read_all_failed",
            Self::Update(_) => "update_failed",
            Self::Delete(_) => "delete_failed",
            Self::Snapshot(_) => "snapshot_failed",
        }
    }

    /// Underlying store failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::InvalidCollection(_) => None,
            Self::Create(err)
            | Self::Read(err)
            | Self::ReadAll(err)
            | Self::Update(err)
            | Self::Delete(err)
            | Self::Snapshot(err) => Some(err),
        }
    }
}

/// CRUD operations over one collection.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Name of the backing collection.
    fn collection(&self) -> &str;

    async fn create(&self, data: DocumentData) -> RepoResult<DocumentRef>;
    async fn read_one(&self, id: &str) -> RepoResult<DocumentRef>;
    async fn read_all(&self) -> RepoResult<Vec<DocumentRef>>;
    async fn update(&self, id: &str, data: DocumentData) -> RepoResult<DocumentRef>;
    async fn delete(&self, id: &str) -> RepoResult<DocumentRef>;

    /// Resolves a reference into the document's current state.
    async fn snapshot(&self, reference: &DocumentRef) -> RepoResult<DocumentSnapshot>;
}

/// `DocumentRepository` bound to one collection of a shared store.
#[derive(Clone)]
pub struct CollectionRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl CollectionRepository {
    /// Creates a repository after validating the collection name.
    pub fn try_new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
    ) -> RepoResult<Self> {
        let collection = collection.into();
        validate_collection_name(&collection).map_err(RepoError::InvalidCollection)?;
        Ok(Self { store, collection })
    }

    fn reference(&self, id: &str) -> Result<DocumentRef, StoreError> {
        self.store.doc(&self.collection, id)
    }
}

#[async_trait]
impl DocumentRepository for CollectionRepository {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn create(&self, data: DocumentData) -> RepoResult<DocumentRef> {
        let field_count = data.len();
        let reference = self
            .store
            .add(&self.collection, data)
            .await
            .map_err(|err| log_failure("create", &self.collection, RepoError::Create(err)))?;

        info!(
            "event=repo_create module=repo status=ok collection={} id={} fields={}",
            self.collection,
            reference.id(),
            field_count
        );
        Ok(reference)
    }

    async fn read_one(&self, id: &str) -> RepoResult<DocumentRef> {
        self.reference(id)
            .map_err(|err| log_failure("read_one", &self.collection, RepoError::Read(err)))
    }

    async fn read_all(&self) -> RepoResult<Vec<DocumentRef>> {
        let references = self
            .store
            .list_documents(&self.collection)
            .await
            .map_err(|err| log_failure("read_all", &self.collection, RepoError::ReadAll(err)))?;

        debug!(
            "event=repo_read_all module=repo status=ok collection={} count={}",
            self.collection,
            references.len()
        );
        Ok(references)
    }

    async fn update(&self, id: &str, data: DocumentData) -> RepoResult<DocumentRef> {
        let fail = |err| log_failure("update", &self.collection, RepoError::Update(err));

        let reference = self.reference(id).map_err(fail)?;
        let snapshot = self.store.get(&reference).await.map_err(fail)?;
        if !snapshot.exists() {
            debug!(
                "event=repo_update module=repo status=skipped reason=not_found collection={} id={}",
                self.collection, id
            );
            return Ok(reference);
        }

        self.store.update(&reference, data).await.map_err(fail)?;
        info!(
            "event=repo_update module=repo status=ok collection={} id={}",
            self.collection, id
        );
        Ok(reference)
    }

    async fn delete(&self, id: &str) -> RepoResult<DocumentRef> {
        let fail = |err| log_failure("delete", &self.collection, RepoError::Delete(err));

        let reference = self.reference(id).map_err(fail)?;
        self.store.delete(&reference).await.map_err(fail)?;
        info!(
            "event=repo_delete module=repo status=ok collection={} id={}",
            self.collection, id
        );
        Ok(reference)
    }

    async fn snapshot(&self, reference: &DocumentRef) -> RepoResult<DocumentSnapshot> {
        self.store
            .get(reference)
            .await
            .map_err(|err| log_failure("snapshot", &self.collection, RepoError::Snapshot(err)))
    }
}

fn log_failure(operation: &str, collection: &str, err: RepoError) -> RepoError {
    let cause = err
        .store_error()
        .map_or_else(String::new, ToString::to_string);
    warn!(
        "event=repo_{operation} module=repo status=error collection={collection} error_code={} error={} cause={}",
        err.code(),
        err,
        cause
    );
    err
}
