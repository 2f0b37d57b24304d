//! HTTP surface for docrest resources.
//!
//! # Responsibility
//! - Bind `/{prefix}/{resource}` paths and verbs to resource controllers.
//! - Translate request bodies and path ids into `ControllerRequest`s and
//!   controller outcomes into HTTP responses.
//!
//! # Invariants
//! - Handlers never panic; every failure becomes an `HttpError` response.
//! - Store failure detail is logged, never sent to clients.

mod body;
mod error;
mod handlers;
mod request_log;
mod router;

pub use body::parse_body;
pub use error::HttpError;
pub use router::{ApiRouter, API_PREFIX};
