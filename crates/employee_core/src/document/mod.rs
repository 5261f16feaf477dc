//! Document collection contract consumed by record stores.
//!
//! # Responsibility
//! - Define the storage collaborator interface (`DocumentCollection`).
//! - Define filter/update value types and their matching semantics.
//!
//! # Invariants
//! - Identity lives beside the document body, never inside it.
//! - Collaborator failures surface as `StorageError` and are never masked.

mod query;
pub mod sqlite;

use crate::db::DbError;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use query::{Filter, QueryError, Update, ID_FIELD};
pub use sqlite::SqliteCollection;

/// Identity assigned by the collection on insert.
pub type DocumentId = Uuid;

/// JSON object body of a stored document.
pub type Document = Map<String, Value>;

pub type StorageResult<T> = Result<T, StorageError>;

/// A document body together with its storage identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Document,
}

/// Result counters for update operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Documents selected by the filter (capped at 1 for single updates).
    pub matched: u64,
    /// Documents whose body actually changed.
    pub modified: u64,
}

/// Failure raised by a document collection.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Encoding(serde_json::Error),
    Corrupt(String),
    Uninitialized {
        expected_version: u32,
        actual_version: u32,
    },
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encoding(err) => write!(f, "document encoding failed: {err}"),
            Self::Corrupt(message) => write!(f, "corrupt stored document: {message}"),
            Self::Uninitialized {
                expected_version,
                actual_version,
            } => write!(
                f,
                "database schema version {actual_version} is not initialized; expected {expected_version}"
            ),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encoding(err) => Some(err),
            Self::Corrupt(_) | Self::Uninitialized { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encoding(value)
    }
}

/// Addressable collection of JSON documents.
///
/// Implementations own durability, ordering and isolation. Read order is the
/// implementation's natural order.
pub trait DocumentCollection {
    /// Inserts `body` and returns the newly assigned identity.
    fn insert_one(&self, body: &Document) -> StorageResult<DocumentId>;
    /// Returns the first document matching `filter`.
    fn find_one(&self, filter: &Filter) -> StorageResult<Option<StoredDocument>>;
    /// Returns all documents matching `filter`.
    fn find_many(&self, filter: &Filter) -> StorageResult<Vec<StoredDocument>>;
    /// Applies `update` to the first document matching `filter`.
    fn update_one(&self, filter: &Filter, update: &Update) -> StorageResult<UpdateOutcome>;
    /// Applies `update` to every document matching `filter`.
    fn update_many(&self, filter: &Filter, update: &Update) -> StorageResult<UpdateOutcome>;
    /// Overwrites the body stored under `id`; `false` when `id` is unknown.
    fn replace_one(&self, id: DocumentId, body: &Document) -> StorageResult<bool>;
    /// Removes the first document matching `filter`; returns removed count.
    fn delete_one(&self, filter: &Filter) -> StorageResult<u64>;
    /// Removes every document matching `filter`; returns removed count.
    fn delete_many(&self, filter: &Filter) -> StorageResult<u64>;
}

impl<C: DocumentCollection + ?Sized> DocumentCollection for &C {
    fn insert_one(&self, body: &Document) -> StorageResult<DocumentId> {
        (**self).insert_one(body)
    }

    fn find_one(&self, filter: &Filter) -> StorageResult<Option<StoredDocument>> {
        (**self).find_one(filter)
    }

    fn find_many(&self, filter: &Filter) -> StorageResult<Vec<StoredDocument>> {
        (**self).find_many(filter)
    }

    fn update_one(&self, filter: &Filter, update: &Update) -> StorageResult<UpdateOutcome> {
        (**self).update_one(filter, update)
    }

    fn update_many(&self, filter: &Filter, update: &Update) -> StorageResult<UpdateOutcome> {
        (**self).update_many(filter, update)
    }

    fn replace_one(&self, id: DocumentId, body: &Document) -> StorageResult<bool> {
        (**self).replace_one(id, body)
    }

    fn delete_one(&self, filter: &Filter) -> StorageResult<u64> {
        (**self).delete_one(filter)
    }

    fn delete_many(&self, filter: &Filter) -> StorageResult<u64> {
        (**self).delete_many(filter)
    }
}
