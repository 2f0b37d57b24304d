//! Document references, snapshots and naming rules.
//!
//! # Responsibility
//! - Model a document as an untyped field mapping.
//! - Validate collection names and document ids before they reach a store.
//!
//! # Invariants
//! - Collection names match `^[A-Za-z0-9_-]{1,128}$`.
//! - Document ids are non-empty, contain no `/`, are not `.` or `..`, and are
//!   at most 1500 bytes long.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Field mapping of one document: field name to scalar, nested map or array.
pub type DocumentData = serde_json::Map<String, serde_json::Value>;

const MAX_DOCUMENT_ID_BYTES: usize = 1500;

static COLLECTION_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("collection name pattern is valid")
});

/// Rejected collection name or document id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("invalid collection name `{0}`; expected 1-128 chars of [A-Za-z0-9_-]")]
    Collection(String),
    #[error("invalid document id `{id}`: {reason}")]
    DocumentId { id: String, reason: &'static str },
}

/// Checks a collection name against the naming rules.
pub fn validate_collection_name(name: &str) -> Result<(), NameError> {
    if COLLECTION_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(NameError::Collection(name.to_string()))
    }
}

/// Checks a document id against the store path rules.
pub fn validate_document_id(id: &str) -> Result<(), NameError> {
    let reason = if id.is_empty() {
        "id must not be empty"
    } else if id.contains('/') {
        "id must not contain `/`"
    } else if id == "." || id == ".." {
        "id must not be `.` or `..`"
    } else if id.len() > MAX_DOCUMENT_ID_BYTES {
        "id must be at most 1500 bytes"
    } else {
        return Ok(());
    };

    Err(NameError::DocumentId {
        id: id.to_string(),
        reason,
    })
}

/// Handle to a document location: collection name plus id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentRef {
    collection: String,
    id: String,
}

impl DocumentRef {
    /// Builds a reference after validating both path segments.
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Result<Self, NameError> {
        let collection = collection.into();
        let id = id.into();
        validate_collection_name(&collection)?;
        validate_document_id(&id)?;
        Ok(Self { collection, id })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Display for DocumentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Materialized document data at read time.
///
/// `data` is `None` when the referenced document did not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    reference: DocumentRef,
    data: Option<DocumentData>,
}

impl DocumentSnapshot {
    pub fn new(reference: DocumentRef, data: Option<DocumentData>) -> Self {
        Self { reference, data }
    }

    /// Snapshot of a document that does not exist.
    pub fn missing(reference: DocumentRef) -> Self {
        Self::new(reference, None)
    }

    pub fn id(&self) -> &str {
        self.reference.id()
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&DocumentData> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<DocumentData> {
        self.data
    }
}

/// Shallow merge: every top-level field of `patch` overwrites `target`.
pub fn merge_fields(target: &mut DocumentData, patch: DocumentData) {
    for (field, value) in patch {
        target.insert(field, value);
    }
}
