//! SQLite-backed document collection.
//!
//! # Responsibility
//! - Store JSON document bodies in the shared `documents` table.
//! - Evaluate filters and `$set` updates over a collection scan.
//!
//! # Invariants
//! - Every statement is scoped to this collection's name.
//! - Natural read order is insertion order (`rowid`).
//! - Multi-document writes run inside one transaction.
//! - Rows that fail to decode are reported as `Corrupt`, never skipped.

use super::{
    Document, DocumentCollection, DocumentId, Filter, StorageError, StorageResult, StoredDocument,
    Update, UpdateOutcome,
};
use crate::db::migrations::{current_version, latest_version};
use log::debug;
use rusqlite::{params, Connection, Row};
use serde_json::Value;
use uuid::Uuid;

const TOUCH_UPDATED_AT: &str = "updated_at = (strftime('%s', 'now') * 1000)";

/// Named collection inside a migrated SQLite database.
pub struct SqliteCollection<'conn> {
    conn: &'conn Connection,
    name: String,
}

impl<'conn> SqliteCollection<'conn> {
    /// Binds a collection name to a migrated connection.
    ///
    /// # Errors
    /// - `Uninitialized` when migrations have not been applied to `conn`.
    pub fn try_new(conn: &'conn Connection, name: impl Into<String>) -> StorageResult<Self> {
        let actual_version = current_version(conn)?;
        let expected_version = latest_version();
        if actual_version < expected_version {
            return Err(StorageError::Uninitialized {
                expected_version,
                actual_version,
            });
        }

        Ok(Self {
            conn,
            name: name.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of documents currently stored in this collection.
    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1;",
            [self.name.as_str()],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn scan(&self, filter: &Filter, limit: Option<usize>) -> StorageResult<Vec<StoredDocument>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, body
             FROM documents
             WHERE collection = ?1
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([self.name.as_str()])?;
        let mut matched = Vec::new();

        while let Some(row) = rows.next()? {
            let document = parse_document_row(row)?;
            if filter.matches(document.id, &document.body) {
                matched.push(document);
                if limit.is_some_and(|limit| matched.len() >= limit) {
                    break;
                }
            }
        }

        Ok(matched)
    }

    fn write_body(&self, id: DocumentId, body: &Document) -> StorageResult<usize> {
        let encoded = serde_json::to_string(body)?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE documents SET body = ?1, {TOUCH_UPDATED_AT}
                 WHERE collection = ?2 AND id = ?3;"
            ),
            params![encoded, self.name.as_str(), id.to_string()],
        )?;
        Ok(changed)
    }

    fn remove(&self, id: DocumentId) -> StorageResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![self.name.as_str(), id.to_string()],
        )?;
        Ok(changed)
    }

    fn apply_update(
        &self,
        targets: Vec<StoredDocument>,
        update: &Update,
    ) -> StorageResult<UpdateOutcome> {
        let mut outcome = UpdateOutcome {
            matched: targets.len() as u64,
            modified: 0,
        };

        for mut document in targets {
            if update.apply(&mut document.body) {
                self.write_body(document.id, &document.body)?;
                outcome.modified += 1;
            }
        }

        Ok(outcome)
    }
}

impl DocumentCollection for SqliteCollection<'_> {
    fn insert_one(&self, body: &Document) -> StorageResult<DocumentId> {
        let id = Uuid::new_v4();
        let encoded = serde_json::to_string(body)?;
        self.conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3);",
            params![self.name.as_str(), id.to_string(), encoded],
        )?;

        debug!(
            "event=doc_insert module=document status=ok collection={} id={id}",
            self.name
        );
        Ok(id)
    }

    fn find_one(&self, filter: &Filter) -> StorageResult<Option<StoredDocument>> {
        Ok(self.scan(filter, Some(1))?.into_iter().next())
    }

    fn find_many(&self, filter: &Filter) -> StorageResult<Vec<StoredDocument>> {
        self.scan(filter, None)
    }

    fn update_one(&self, filter: &Filter, update: &Update) -> StorageResult<UpdateOutcome> {
        let targets = self.scan(filter, Some(1))?;
        let outcome = self.apply_update(targets, update)?;
        debug!(
            "event=doc_update module=document status=ok collection={} scope=one matched={} modified={}",
            self.name, outcome.matched, outcome.modified
        );
        Ok(outcome)
    }

    fn update_many(&self, filter: &Filter, update: &Update) -> StorageResult<UpdateOutcome> {
        let tx = self.conn.unchecked_transaction()?;
        let targets = self.scan(filter, None)?;
        let outcome = self.apply_update(targets, update)?;
        tx.commit()?;

        debug!(
            "event=doc_update module=document status=ok collection={} scope=many matched={} modified={}",
            self.name, outcome.matched, outcome.modified
        );
        Ok(outcome)
    }

    fn replace_one(&self, id: DocumentId, body: &Document) -> StorageResult<bool> {
        let replaced = self.write_body(id, body)? > 0;
        debug!(
            "event=doc_replace module=document status=ok collection={} id={id} replaced={replaced}",
            self.name
        );
        Ok(replaced)
    }

    fn delete_one(&self, filter: &Filter) -> StorageResult<u64> {
        let removed = match self.scan(filter, Some(1))?.first() {
            Some(document) => self.remove(document.id)? as u64,
            None => 0,
        };
        debug!(
            "event=doc_delete module=document status=ok collection={} scope=one removed={removed}",
            self.name
        );
        Ok(removed)
    }

    fn delete_many(&self, filter: &Filter) -> StorageResult<u64> {
        let removed = if filter.is_empty() {
            self.conn.execute(
                "DELETE FROM documents WHERE collection = ?1;",
                [self.name.as_str()],
            )? as u64
        } else {
            let tx = self.conn.unchecked_transaction()?;
            let mut removed = 0_u64;
            for document in self.scan(filter, None)? {
                removed += self.remove(document.id)? as u64;
            }
            tx.commit()?;
            removed
        };

        debug!(
            "event=doc_delete module=document status=ok collection={} scope=many removed={removed}",
            self.name
        );
        Ok(removed)
    }
}

fn parse_document_row(row: &Row<'_>) -> StorageResult<StoredDocument> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        StorageError::Corrupt(format!("invalid id value `{id_text}` in documents.id"))
    })?;

    let body_text: String = row.get("body")?;
    let body = match serde_json::from_str::<Value>(&body_text)? {
        Value::Object(body) => body,
        _ => {
            return Err(StorageError::Corrupt(format!(
                "document `{id}` body is not a JSON object"
            )))
        }
    };

    Ok(StoredDocument { id, body })
}
