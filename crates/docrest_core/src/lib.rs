//! Core of the docrest document service.
//! Owns the document model, the store contract, repositories and controllers;
//! transport crates only translate to and from these types.

pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use controller::resource_controller::{
    ApiError, ControllerOptions, ControllerRequest, ControllerResponse, ControllerResult,
    ResourceController, ResponseBody,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::document::{DocumentData, DocumentRef, DocumentSnapshot, NameError};
pub use repo::collection_repo::{CollectionRepository, DocumentRepository, RepoError, RepoResult};
pub use store::{DocumentStore, InMemoryStore, SqliteStore, StoreError, StoreResult};

/// Minimal health-check probe.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
