use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{RecordRow, RowStore, StoreError};

/// SQLite-based row store implementation.
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if missing) a database file and return a store
  /// backed by it.
  pub async fn connect(path: &Path) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true);
    let pool = SqlitePool::connect_with(options)
      .await
      .map_err(|source| StoreError::Database { source })?;
    Ok(Self::new(pool))
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await
  }
}

fn database(source: sqlx::Error) -> StoreError {
  StoreError::Database { source }
}

/// Read-apply-write body of `update_row`, run inside an already-open
/// transaction on `conn`.
async fn transform_row<F>(
  conn: &mut SqliteConnection,
  name: &str,
  apply: F,
) -> Result<RecordRow, StoreError>
where
  F: FnOnce(&RecordRow) -> Result<Vec<u8>, StoreError> + Send,
{
  let row: Option<RecordRow> = sqlx::query_as(
    r#"
        SELECT seq, name, data, created_time
        FROM records
        WHERE name = ?
        "#,
  )
  .bind(name)
  .fetch_optional(&mut *conn)
  .await
  .map_err(database)?;

  let Some(row) = row else {
    return Err(StoreError::NotFound {
      name: name.to_string(),
    });
  };

  let data = apply(&row)?;

  sqlx::query(
    r#"
        UPDATE records
        SET data = ?
        WHERE name = ?
        "#,
  )
  .bind(&data)
  .bind(name)
  .execute(&mut *conn)
  .await
  .map_err(database)?;

  Ok(RecordRow { data, ..row })
}

fn wrap_insert_error(name: &str, err: sqlx::Error) -> StoreError {
  if let sqlx::Error::Database(ref db) = err {
    if db.is_unique_violation() {
      return StoreError::Duplicate {
        name: name.to_string(),
      };
    }
  }
  StoreError::Database { source: err }
}

impl RowStore for SqliteStore {
  async fn insert_row(
    &self,
    name: &str,
    data: &[u8],
    created_time: DateTime<Utc>,
  ) -> Result<i64, StoreError> {
    let result = sqlx::query(
      r#"
            INSERT INTO records (name, data, created_time)
            VALUES (?, ?, ?)
            "#,
    )
    .bind(name)
    .bind(data)
    .bind(created_time)
    .execute(&self.pool)
    .await
    .map_err(|err| wrap_insert_error(name, err))?;

    Ok(result.last_insert_rowid())
  }

  async fn get_row(&self, name: &str) -> Result<Option<RecordRow>, StoreError> {
    sqlx::query_as(
      r#"
            SELECT seq, name, data, created_time
            FROM records
            WHERE name = ?
            "#,
    )
    .bind(name)
    .fetch_optional(&self.pool)
    .await
    .map_err(database)
  }

  async fn update_row<F>(&self, name: &str, apply: F) -> Result<RecordRow, StoreError>
  where
    F: FnOnce(&RecordRow) -> Result<Vec<u8>, StoreError> + Send,
  {
    let mut conn = self.pool.acquire().await.map_err(database)?;

    // Immediate mode takes the write lock up front; concurrent writers
    // queue on the busy timeout instead of failing a deferred lock
    // upgrade between the read and the write.
    sqlx::query("BEGIN IMMEDIATE")
      .execute(&mut *conn)
      .await
      .map_err(database)?;

    match transform_row(&mut conn, name, apply).await {
      Ok(row) => match sqlx::query("COMMIT").execute(&mut *conn).await {
        Ok(_) => Ok(row),
        Err(err) => {
          let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
          Err(database(err))
        }
      },
      Err(err) => {
        // Roll back explicitly before the connection returns to the
        // pool; a failing `apply` leaves the row untouched.
        let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
        Err(err)
      }
    }
  }

  async fn delete_row(&self, name: &str) -> Result<bool, StoreError> {
    let result = sqlx::query(
      r#"
            DELETE FROM records
            WHERE name = ?
            "#,
    )
    .bind(name)
    .execute(&self.pool)
    .await
    .map_err(database)?;

    Ok(result.rows_affected() > 0)
  }

  async fn scan_rows(&self, after: i64, limit: u32) -> Result<Vec<RecordRow>, StoreError> {
    sqlx::query_as(
      r#"
            SELECT seq, name, data, created_time
            FROM records
            WHERE seq > ?
            ORDER BY seq
            LIMIT ?
            "#,
    )
    .bind(after)
    .bind(i64::from(limit))
    .fetch_all(&self.pool)
    .await
    .map_err(database)
  }
}
