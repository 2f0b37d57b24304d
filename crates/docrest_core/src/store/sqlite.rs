//! SQLite-backed document store.
//!
//! Documents are stored as JSON text in the `documents` table keyed by
//! `(collection, id)`. Listing order is creation order.

use super::{new_document_id, DocumentStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::model::document::{
    merge_fields, validate_collection_name, DocumentData, DocumentRef, DocumentSnapshot,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

/// `DocumentStore` over one shared SQLite connection.
///
/// Calls run on the blocking thread pool and are serialized by a mutex.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Wraps an already migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            op(&mut guard)
        })
        .await?
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn add(&self, collection: &str, data: DocumentData) -> StoreResult<DocumentRef> {
        validate_collection_name(collection)?;
        let reference = DocumentRef::new(collection, new_document_id())?;
        let encoded = encode_data(data)?;

        let inserted = reference.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3);",
                params![inserted.collection(), inserted.id(), encoded],
            )?;
            Ok(())
        })
        .await?;

        Ok(reference)
    }

    async fn get(&self, reference: &DocumentRef) -> StoreResult<DocumentSnapshot> {
        let reference = reference.clone();
        self.run(move |conn| {
            let data = select_data(conn, &reference)?;
            Ok(DocumentSnapshot::new(reference, data))
        })
        .await
    }

    async fn list_documents(&self, collection: &str) -> StoreResult<Vec<DocumentRef>> {
        validate_collection_name(collection)?;
        let collection = collection.to_string();
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM documents
                 WHERE collection = ?1
                 ORDER BY created_at ASC, rowid ASC;",
            )?;
            let mut rows = stmt.query([collection.as_str()])?;
            let mut references = Vec::new();
            while let Some(row) = rows.next()? {
                let id: String = row.get("id")?;
                references.push(DocumentRef::new(collection.as_str(), id)?);
            }
            Ok(references)
        })
        .await
    }

    async fn update(&self, reference: &DocumentRef, data: DocumentData) -> StoreResult<()> {
        let reference = reference.clone();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let mut existing = select_data(&tx, &reference)?
                .ok_or_else(|| StoreError::NotFound(reference.clone()))?;
            merge_fields(&mut existing, data);
            let encoded = encode_data(existing)?;

            tx.execute(
                "UPDATE documents
                 SET
                    data = ?1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE collection = ?2 AND id = ?3;",
                params![encoded, reference.collection(), reference.id()],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, reference: &DocumentRef) -> StoreResult<()> {
        let reference = reference.clone();
        self.run(move |conn| {
            conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
                params![reference.collection(), reference.id()],
            )?;
            Ok(())
        })
        .await
    }
}

fn select_data(conn: &Connection, reference: &DocumentRef) -> StoreResult<Option<DocumentData>> {
    let text: Option<String> = conn
        .query_row(
            "SELECT data FROM documents WHERE collection = ?1 AND id = ?2;",
            params![reference.collection(), reference.id()],
            |row| row.get(0),
        )
        .optional()?;

    text.map(|text| decode_data(reference, &text)).transpose()
}

fn encode_data(data: DocumentData) -> StoreResult<String> {
    Ok(serde_json::to_string(&serde_json::Value::Object(data))?)
}

fn decode_data(reference: &DocumentRef, text: &str) -> StoreResult<DocumentData> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(data)) => Ok(data),
        Ok(other) => Err(StoreError::CorruptDocument {
            reference: reference.clone(),
            message: format!("expected a JSON object, found `{other}`"),
        }),
        Err(err) => Err(StoreError::CorruptDocument {
            reference: reference.clone(),
            message: err.to_string(),
        }),
    }
}
