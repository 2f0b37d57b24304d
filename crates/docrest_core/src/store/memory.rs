//! Process-local document store.
//!
//! Documents live in a `BTreeMap` per collection, so listing order is id order.

use super::{new_document_id, DocumentStore, StoreError, StoreResult};
use crate::model::document::{
    merge_fields, validate_collection_name, DocumentData, DocumentRef, DocumentSnapshot,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

type Collections = BTreeMap<String, BTreeMap<String, DocumentData>>;

/// In-memory `DocumentStore`; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn add(&self, collection: &str, data: DocumentData) -> StoreResult<DocumentRef> {
        validate_collection_name(collection)?;
        let reference = DocumentRef::new(collection, new_document_id())?;

        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(reference.id().to_string(), data);

        Ok(reference)
    }

    async fn get(&self, reference: &DocumentRef) -> StoreResult<DocumentSnapshot> {
        let data = self
            .collections
            .read()
            .get(reference.collection())
            .and_then(|documents| documents.get(reference.id()))
            .cloned();

        Ok(DocumentSnapshot::new(reference.clone(), data))
    }

    async fn list_documents(&self, collection: &str) -> StoreResult<Vec<DocumentRef>> {
        validate_collection_name(collection)?;
        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        documents
            .keys()
            .map(|id| DocumentRef::new(collection, id.as_str()).map_err(StoreError::from))
            .collect()
    }

    async fn update(&self, reference: &DocumentRef, data: DocumentData) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let existing = collections
            .get_mut(reference.collection())
            .and_then(|documents| documents.get_mut(reference.id()))
            .ok_or_else(|| StoreError::NotFound(reference.clone()))?;

        merge_fields(existing, data);
        Ok(())
    }

    async fn delete(&self, reference: &DocumentRef) -> StoreResult<()> {
        let mut collections = self.collections.write();
        if let Some(documents) = collections.get_mut(reference.collection()) {
            documents.remove(reference.id());
            if documents.is_empty() {
                collections.remove(reference.collection());
            }
        }
        Ok(())
    }
}
