//! Router assembly.

use crate::handlers::{self, ResourceState};
use crate::request_log::log_request;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use docrest_core::{DocumentRepository, ResourceController};
use std::sync::Arc;

/// Versioned prefix every resource is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Builder mounting one CRUD resource per controller.
///
/// ```ignore
/// let app = ApiRouter::new().resource("users", users_controller).build();
/// ```
pub struct ApiRouter {
    prefix: String,
    resources: Router,
}

impl Default for ApiRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiRouter {
    pub fn new() -> Self {
        Self::with_prefix(API_PREFIX)
    }

    /// Mounts resources under `prefix` instead of [`API_PREFIX`].
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_end_matches('/').to_string();
        Self {
            prefix,
            resources: Router::new(),
        }
    }

    /// Mounts `controller` at `{prefix}/{name}` and `{prefix}/{name}/{id}`.
    ///
    /// # Panics
    /// Panics when `name` is already mounted.
    pub fn resource<R: DocumentRepository + 'static>(
        mut self,
        name: &str,
        controller: ResourceController<R>,
    ) -> Self {
        let state = Arc::new(ResourceState {
            controller,
            base_path: format!("{}/{name}", self.prefix),
        });

        let routes = Router::new()
            .route(
                &format!("/{name}"),
                get(handlers::read_all::<R>)
                    .post(handlers::create::<R>)
                    .put(handlers::update_without_id::<R>)
                    .patch(handlers::update_without_id::<R>)
                    .delete(handlers::delete_without_id::<R>),
            )
            .route(
                &format!("/{name}/{{id}}"),
                get(handlers::read_one::<R>)
                    .put(handlers::update::<R>)
                    .patch(handlers::update::<R>)
                    .delete(handlers::delete::<R>),
            )
            .with_state(state);

        self.resources = self.resources.merge(routes);
        self
    }

    /// Finishes the router: resources, `/health`, and request logging.
    pub fn build(self) -> Router {
        let router = Router::new().route("/health", get(handlers::health));
        let router = if self.prefix.is_empty() {
            router.merge(self.resources)
        } else {
            router.nest(&self.prefix, self.resources)
        };
        router.layer(middleware::from_fn(log_request))
    }
}
