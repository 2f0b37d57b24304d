//! Document data model shared by store, repository and controller layers.
//!
//! # Responsibility
//! - Define references, snapshots and the untyped field mapping.
//! - Own naming rules for collections and document ids.
//!
//! # Invariants
//! - A `DocumentRef` never guarantees that its document exists.
//! - Existence is only known from a `DocumentSnapshot`.

pub mod document;
