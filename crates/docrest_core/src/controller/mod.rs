//! Resource controllers.
//!
//! # Responsibility
//! - Adapt request/response semantics onto a collection repository.
//! - Keep HTTP framework types out of core; callers map the plain
//!   `ControllerResponse`/`ApiError` values onto their transport.
//!
//! # Invariants
//! - Every operation resolves to exactly one response or exactly one error.
//! - Input validation failures never reach the repository.

pub mod resource_controller;
