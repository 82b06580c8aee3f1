//! Runvault Store
//!
//! This crate provides the row store trait and its SQLite
//! implementation. The store is deliberately generic: it persists one
//! opaque blob per record alongside a few indexed columns, and knows
//! nothing about record contents, filters, or merge semantics.
//!
//! Rows carry a monotonically increasing `seq` assigned at insert time;
//! scans walk rows in `seq` order and report each row's `seq` so a
//! caller can resume where it stopped.

mod sqlite;

use std::future::Future;

use chrono::{DateTime, Utc};

pub use sqlite::SqliteStore;

/// One stored record row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RecordRow {
  /// Creation-ordered scan cursor, assigned by the store.
  pub seq: i64,
  /// Unique record name.
  pub name: String,
  /// Serialized record blob.
  pub data: Vec<u8>,
  /// Creation time, kept as an indexed column.
  pub created_time: DateTime<Utc>,
}

/// Errors raised by row store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// Insert collided with an existing row name.
  #[error("row already exists: {name}")]
  Duplicate { name: String },

  /// The named row does not exist.
  #[error("row not found: {name}")]
  NotFound { name: String },

  /// The caller's row transformation failed inside `update_row`.
  #[error("failed to transform row data: {message}")]
  Data { message: String },

  /// The database engine reported a failure.
  #[error("database error: {source}")]
  Database {
    #[source]
    source: sqlx::Error,
  },
}

/// Storage trait for record rows.
pub trait RowStore: Send + Sync {
  /// Insert a new row, returning its assigned `seq`. Reports
  /// [`StoreError::Duplicate`] on a name collision.
  fn insert_row(
    &self,
    name: &str,
    data: &[u8],
    created_time: DateTime<Utc>,
  ) -> impl Future<Output = Result<i64, StoreError>> + Send;

  /// Fetch a row by name.
  fn get_row(
    &self,
    name: &str,
  ) -> impl Future<Output = Result<Option<RecordRow>, StoreError>> + Send;

  /// Read-modify-write a row inside a single transaction: the current
  /// row is read, `apply` produces the replacement blob, and the write
  /// commits atomically. Nothing is written when `apply` fails.
  fn update_row<F>(
    &self,
    name: &str,
    apply: F,
  ) -> impl Future<Output = Result<RecordRow, StoreError>> + Send
  where
    F: FnOnce(&RecordRow) -> Result<Vec<u8>, StoreError> + Send;

  /// Delete a row by name, reporting whether it existed.
  fn delete_row(&self, name: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

  /// Fetch up to `limit` rows with `seq` strictly greater than `after`,
  /// in `seq` order.
  fn scan_rows(
    &self,
    after: i64,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<RecordRow>, StoreError>> + Send;
}
