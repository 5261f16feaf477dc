//! Store configuration.
//!
//! # Responsibility
//! - Describe which database and collection back the employee store.
//! - Select how update payloads are checked before reaching storage.
//!
//! # Invariants
//! - Missing keys fall back to defaults; unknown keys are rejected.
//! - `collection` is never empty after loading.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::document::{SqliteCollection, StorageResult};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "employees";

/// How `update_one`/`update_many` payloads are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateValidation {
    /// Forward changes untouched, including unknown and wrong-typed fields.
    PassThrough,
    /// Schema fields must be non-empty strings; unknown fields are dropped.
    #[default]
    Types,
    /// As `Types`, and unknown fields are rejected instead of dropped.
    Strict,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Employee store configuration (camelCase JSON).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub update_validation: UpdateValidation,
    /// Database file; `None` selects a private in-memory database.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Log level passed to `init_logging`; build default when absent.
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            update_validation: UpdateValidation::default(),
            database_path: None,
            log_level: None,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parses configuration from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        if config.collection.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "collection cannot be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Opens the configured database with migrations applied.
    pub fn open_connection(&self) -> DbResult<Connection> {
        match &self.database_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }

    /// Binds the configured collection to `conn`.
    pub fn open_collection<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> StorageResult<SqliteCollection<'conn>> {
        SqliteCollection::try_new(conn, self.collection.as_str())
    }

    /// Effective log level for this configuration.
    pub fn effective_log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(crate::logging::default_log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, UpdateValidation, DEFAULT_COLLECTION};
    use std::path::PathBuf;

    #[test]
    fn empty_object_uses_defaults() {
        let config = StoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.collection, DEFAULT_COLLECTION);
        assert_eq!(config.update_validation, UpdateValidation::Types);
        assert_eq!(config.effective_log_level(), crate::logging::default_log_level());
    }

    #[test]
    fn parses_camel_case_keys() {
        let config = StoreConfig::from_json_str(
            r#"{
                "collection": "staff",
                "updateValidation": "pass_through",
                "databasePath": "/tmp/company.db",
                "logLevel": "warn"
            }"#,
        )
        .unwrap();

        assert_eq!(config.collection, "staff");
        assert_eq!(config.update_validation, UpdateValidation::PassThrough);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/company.db")));
        assert_eq!(config.effective_log_level(), "warn");
    }

    #[test]
    fn rejects_unknown_keys_and_blank_collection() {
        assert!(matches!(
            StoreConfig::from_json_str(r#"{"colection": "typo"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            StoreConfig::from_json_str(r#"{"collection": "  "}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"updateValidation": "strict"}"#).unwrap();

        let config = StoreConfig::from_file(&path).unwrap();
        assert_eq!(config.update_validation, UpdateValidation::Strict);

        let missing = StoreConfig::from_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
