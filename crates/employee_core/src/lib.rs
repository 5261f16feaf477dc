//! Employee record store.
//! Schema validation and CRUD over a document collection.

pub mod config;
pub mod db;
pub mod document;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig, UpdateValidation, DEFAULT_COLLECTION};
pub use document::{
    Document, DocumentCollection, DocumentId, Filter, QueryError, SqliteCollection, StorageError,
    StorageResult, StoredDocument, Update, UpdateOutcome,
};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::employee::{
    validate, Candidate, Employee, EmployeeField, EmployeeId, EmployeeValidationError, FieldIssue,
    IssueKind,
};
pub use repo::employee_repo::{EmployeeRepository, EmployeeStore, RepoError, RepoResult};
pub use service::employee_service::EmployeeService;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
