//! Server configuration loaded from environment variables.
//!
//! Variables (all optional):
//! - `DOCREST_BIND` - listen address (default: `127.0.0.1:8080`)
//! - `DOCREST_STORE` - `memory` or `sqlite` (default: `memory`)
//! - `DOCREST_DB_PATH` - SQLite file for the sqlite store (default: `docrest.sqlite3`)
//! - `DOCREST_RESOURCES` - comma-separated resource names (default: `users`)
//! - `DOCREST_LOG_LEVEL` - `trace|debug|info|warn|error` (default: build dependent)
//! - `DOCREST_LOG_DIR` - absolute directory for rolling log files (default: stderr)
//! - `DOCREST_EMPTY_COLLECTION_OK` - answer `200 []` for empty collections (default: false)

use anyhow::{bail, Context, Result};
use docrest_core::default_log_level;
use docrest_core::model::document::validate_collection_name;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_DB_PATH: &str = "docrest.sqlite3";
const DEFAULT_RESOURCES: &str = "users";

/// Backing document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => bail!("unsupported store `{other}`; expected memory|sqlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub store: StoreKind,
    pub db_path: PathBuf,
    pub resources: Vec<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub empty_collection_ok: bool,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_text = read("DOCREST_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_text
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("DOCREST_BIND `{bind_text}` is not a socket address"))?;

        let store = match read("DOCREST_STORE") {
            Some(value) => value.parse::<StoreKind>().context("invalid DOCREST_STORE")?,
            None => StoreKind::Memory,
        };

        let resources = parse_resources(
            &read("DOCREST_RESOURCES").unwrap_or_else(|| DEFAULT_RESOURCES.to_string()),
        )?;

        let empty_collection_ok = match read("DOCREST_EMPTY_COLLECTION_OK") {
            Some(value) => parse_flag(&value).with_context(|| {
                format!("DOCREST_EMPTY_COLLECTION_OK `{value}` is not a boolean")
            })?,
            None => false,
        };

        Ok(Self {
            bind,
            store,
            db_path: read("DOCREST_DB_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from),
            resources,
            log_level: read("DOCREST_LOG_LEVEL")
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read("DOCREST_LOG_DIR"),
            empty_collection_ok,
        })
    }
}

fn parse_resources(raw: &str) -> Result<Vec<String>> {
    let mut resources: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        validate_collection_name(name).context("invalid DOCREST_RESOURCES entry")?;
        if resources.iter().any(|known| known == name) {
            bail!("resource `{name}` listed twice in DOCREST_RESOURCES");
        }
        resources.push(name.to_string());
    }

    if resources.is_empty() {
        bail!("DOCREST_RESOURCES must name at least one resource");
    }
    Ok(resources)
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected true|false, got `{other}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::{ServerConfig, StoreKind};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.db_path, PathBuf::from("docrest.sqlite3"));
        assert_eq!(config.resources, vec!["users".to_string()]);
        assert_eq!(config.log_dir, None);
        assert!(!config.empty_collection_ok);
    }

    #[test]
    fn values_override_defaults() {
        let config = config_from(&[
            ("DOCREST_BIND", "0.0.0.0:9000"),
            ("DOCREST_STORE", "SQLite"),
            ("DOCREST_DB_PATH", "/var/lib/docrest/data.sqlite3"),
            ("DOCREST_RESOURCES", "users, teams ,,projects"),
            ("DOCREST_LOG_LEVEL", "warn"),
            ("DOCREST_LOG_DIR", "/var/log/docrest"),
            ("DOCREST_EMPTY_COLLECTION_OK", "yes"),
        ])
        .unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/docrest/data.sqlite3"));
        assert_eq!(config.resources, ["users", "teams", "projects"]);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/docrest"));
        assert!(config.empty_collection_ok);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("DOCREST_LOG_DIR", "  "), ("DOCREST_STORE", "")]).unwrap();
        assert_eq!(config.log_dir, None);
        assert_eq!(config.store, StoreKind::Memory);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_from(&[("DOCREST_BIND", "nowhere")]).is_err());
        assert!(config_from(&[("DOCREST_STORE", "firestore")]).is_err());
        assert!(config_from(&[("DOCREST_RESOURCES", "users/admins")]).is_err());
        assert!(config_from(&[("DOCREST_RESOURCES", "users,users")]).is_err());
        assert!(config_from(&[("DOCREST_RESOURCES", " , ")]).is_err());
        assert!(config_from(&[("DOCREST_EMPTY_COLLECTION_OK", "maybe")]).is_err());
    }
}
