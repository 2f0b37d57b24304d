//! Repository layer over the document store.
//!
//! # Responsibility
//! - Define collection-scoped data access contracts.
//! - Isolate store client details from controller orchestration.
//!
//! # Invariants
//! - Repository APIs return references, not data.
//! - Store failures are wrapped per operation, never swallowed.

pub mod collection_repo;
