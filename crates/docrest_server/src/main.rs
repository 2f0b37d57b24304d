//! docrest server entry point.
//!
//! # Responsibility
//! - Load configuration, start logging, open the store once, and serve the
//!   CRUD router until Ctrl-C.

mod config;

use anyhow::{Context, Result};
use axum::Router;
use config::{ServerConfig, StoreKind};
use docrest_core::{
    init_logging, CollectionRepository, ControllerOptions, DocumentStore, InMemoryStore,
    ResourceController, SqliteStore,
};
use docrest_http::{ApiRouter, API_PREFIX};
use log::{info, warn};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    init_logging(&config.log_level, config.log_dir.as_deref())
        .context("failed to initialize logging")?;

    let store = open_store(&config)?;
    let app = build_app(&config, store)?;

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        "event=server_start module=server status=ok bind={} store={:?} prefix={} resources={}",
        config.bind,
        config.store,
        API_PREFIX,
        config.resources.join(",")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with an error")?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

fn open_store(config: &ServerConfig) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.store {
        StoreKind::Memory => Arc::new(InMemoryStore::new()),
        StoreKind::Sqlite => Arc::new(
            SqliteStore::open(&config.db_path)
                .with_context(|| format!("failed to open {}", config.db_path.display()))?,
        ),
    };
    Ok(store)
}

fn build_app(config: &ServerConfig, store: Arc<dyn DocumentStore>) -> Result<Router> {
    let options = ControllerOptions {
        empty_collection_is_error: !config.empty_collection_ok,
    };

    let mut router = ApiRouter::new();
    for name in &config.resources {
        let repo = CollectionRepository::try_new(Arc::clone(&store), name.as_str())?;
        router = router.resource(name, ResourceController::with_options(repo, options));
    }
    Ok(router.build())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=server_signal module=server status=error error={err}");
    }
}
