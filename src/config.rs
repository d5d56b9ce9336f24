//! Application configuration loaded from environment variables.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string; the in-memory store is used when unset
    pub database_url: Option<String>,
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Directory holding the storage buckets
    pub storage_root: PathBuf,
    /// Identities allowed to review submissions and settle sales
    pub reviewer_ids: HashSet<Uuid>,
    pub run_migrations: bool,
    pub cors_permissive: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (used by tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            database_url: var("DATABASE_URL"),
            bind_addr: var("BIND_ADDR")
                .unwrap_or_else(|| "0.0.0.0:3000".to_string())
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    key: "BIND_ADDR",
                    message: e.to_string(),
                })?,
            storage_root: var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./storage")),
            reviewer_ids: parse_reviewers(var("REVIEWER_IDS").as_deref().unwrap_or(""))?,
            run_migrations: parse_bool("RUN_MIGRATIONS", var("RUN_MIGRATIONS"), true)?,
            cors_permissive: parse_bool("CORS_PERMISSIVE", var("CORS_PERMISSIVE"), true)?,
        })
    }
}

fn parse_reviewers(raw: &str) -> Result<HashSet<Uuid>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|e| ConfigError::Invalid {
                key: "REVIEWER_IDS",
                message: format!("{s}: {e}"),
            })
        })
        .collect()
}

fn parse_bool(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                message: format!("expected a boolean, got {v}"),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.storage_root, PathBuf::from("./storage"));
        assert!(config.reviewer_ids.is_empty());
        assert!(config.run_migrations);
        assert!(config.cors_permissive);
    }

    #[test]
    fn test_reviewer_ids_are_parsed() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!("{a}, {b},");
        let config = config(&[("REVIEWER_IDS", raw.as_str())]).unwrap();
        assert_eq!(config.reviewer_ids, HashSet::from([a, b]));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = config(&[("REVIEWER_IDS", "not-a-uuid")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "REVIEWER_IDS", .. }));

        let err = config(&[("RUN_MIGRATIONS", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RUN_MIGRATIONS", .. }));

        let err = config(&[("BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BIND_ADDR", .. }));
    }

    #[test]
    fn test_blank_database_url_means_memory() {
        let config = config(&[("DATABASE_URL", "  "), ("RUN_MIGRATIONS", "off")]).unwrap();
        assert_eq!(config.database_url, None);
        assert!(!config.run_migrations);
    }
}
