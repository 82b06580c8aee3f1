//! The result service.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use runvault_filter::FilterEnv;
use runvault_record::{Record, codec, merge};
use runvault_store::{RowStore, StoreError};

use crate::error::ServiceError;
use crate::pagination::Batcher;
use crate::token::PageToken;

/// Tuning knobs for the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
  /// Page size used when the caller omits one (also the batcher floor).
  pub default_page_size: usize,
  /// Hard ceiling on both the page size and any single scan fetch.
  pub max_page_size: usize,
  /// Cap on scan rounds per list call; when hit, the accumulated page
  /// is returned with a continuation token instead of an error.
  pub max_rounds: usize,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      default_page_size: 50,
      max_page_size: 10000,
      max_rounds: 10,
    }
  }
}

/// A list query.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
  /// Boolean filter expression; empty matches every record.
  pub filter: String,
  /// Desired page size; `None` or `Some(0)` uses the server default.
  pub page_size: Option<u32>,
  /// Continuation token from a previous call for the same filter.
  pub page_token: Option<String>,
}

/// One page of list results.
#[derive(Debug, Clone)]
pub struct ListResponse {
  pub records: Vec<Record>,
  /// Present when more rows may remain; feed back into the next call.
  pub next_page_token: Option<String>,
}

/// CRUD and list queries over stored records.
///
/// The filter environment is constructed here and lives as long as the
/// service instance; filters are compiled against it once per list
/// call.
pub struct ResultService<S> {
  store: S,
  env: FilterEnv,
  config: ServiceConfig,
}

impl<S: RowStore> ResultService<S> {
  pub fn new(store: S) -> Self {
    Self::with_config(store, ServiceConfig::default())
  }

  pub fn with_config(store: S, config: ServiceConfig) -> Self {
    Self {
      store,
      env: FilterEnv::new(),
      config,
    }
  }

  /// Store a new record.
  ///
  /// The server is authoritative over identity: any caller-supplied
  /// `name` or `created_time` is overwritten. An identifier collision
  /// is retried with a fresh name exactly once, then surfaced.
  #[instrument(skip(self, record))]
  pub async fn create(&self, mut record: Record) -> Result<Record, ServiceError> {
    let created_time = Utc::now();
    record.created_time = Some(created_time);
    record.name = Uuid::new_v4().to_string();

    let mut retried = false;
    loop {
      let data =
        codec::encode(&record).map_err(|err| ServiceError::from_codec("create record", err))?;
      match self
        .store
        .insert_row(&record.name, &data, created_time)
        .await
      {
        Ok(seq) => {
          info!(name = %record.name, seq, "record_created");
          return Ok(record);
        }
        Err(StoreError::Duplicate { .. }) if !retried => {
          retried = true;
          warn!(name = %record.name, "generated name collided, regenerating");
          record.name = Uuid::new_v4().to_string();
        }
        Err(err) => return Err(ServiceError::from_store("create record", err)),
      }
    }
  }

  /// Fetch a record by name.
  #[instrument(skip(self))]
  pub async fn get(&self, name: &str) -> Result<Record, ServiceError> {
    let row = self
      .store
      .get_row(name)
      .await
      .map_err(|err| ServiceError::from_store("get record", err))?;
    let Some(row) = row else {
      return Err(ServiceError::NotFound {
        name: name.to_string(),
      });
    };
    codec::decode(&row.data).map_err(|err| ServiceError::from_codec("get record", err))
  }

  /// Update a record, fully or by field paths.
  ///
  /// The read-merge-write runs inside a single store transaction, so
  /// concurrent updates to the same name serialize to one of the two
  /// values and never to a mixture. Field paths are validated before
  /// anything is read or written.
  #[instrument(skip(self, incoming, field_paths))]
  pub async fn update(
    &self,
    name: &str,
    incoming: Record,
    field_paths: Option<&[String]>,
  ) -> Result<Record, ServiceError> {
    if let Some(paths) = field_paths {
      for path in paths {
        if merge::field_path(path).is_none() {
          return Err(ServiceError::invalid(format!("unknown field path: {path}")));
        }
      }
      // An empty path list touches nothing; answer from the stored
      // record without a write.
      if paths.is_empty() {
        return self.get(name).await;
      }
    }

    let row = self
      .store
      .update_row(name, |row| {
        let existing = codec::decode(&row.data).map_err(|err| StoreError::Data {
          message: err.to_string(),
        })?;
        let merged =
          merge::merge(&existing, &incoming, field_paths).map_err(|err| StoreError::Data {
            message: err.to_string(),
          })?;
        codec::encode(&merged).map_err(|err| StoreError::Data {
          message: err.to_string(),
        })
      })
      .await
      .map_err(|err| ServiceError::from_store("update record", err))?;

    info!(name, "record_updated");
    codec::decode(&row.data).map_err(|err| ServiceError::from_codec("update record", err))
  }

  /// Delete a record by name. Succeeds exactly once per live record; a
  /// second delete reports the record as missing.
  #[instrument(skip(self))]
  pub async fn delete(&self, name: &str) -> Result<(), ServiceError> {
    let existed = self
      .store
      .delete_row(name)
      .await
      .map_err(|err| ServiceError::from_store("delete record", err))?;
    if !existed {
      return Err(ServiceError::NotFound {
        name: name.to_string(),
      });
    }
    info!(name, "record_deleted");
    Ok(())
  }

  /// List records matching a filter, one page at a time.
  ///
  /// Physical rows are scanned in creation order and evaluated against
  /// the compiled filter; the batcher grows each round's fetch size
  /// from the previous round's yield. The call stops when the page is
  /// full, the store is exhausted, the round cap is hit, or the caller
  /// cancels after at least one completed round; all but exhaustion
  /// return a continuation token.
  #[instrument(skip(self, req, cancel), fields(filter = %req.filter))]
  pub async fn list(
    &self,
    req: &ListRequest,
    cancel: &CancellationToken,
  ) -> Result<ListResponse, ServiceError> {
    let requested = match req.page_size {
      None | Some(0) => self.config.default_page_size,
      Some(n) => (n as usize).min(self.config.max_page_size),
    };

    let mut cursor = 0i64;
    if let Some(token) = req.page_token.as_deref().filter(|t| !t.is_empty()) {
      let token = PageToken::decode(token)?;
      if token.filter != req.filter {
        return Err(ServiceError::invalid(
          "page token does not match the query filter",
        ));
      }
      cursor = token.cursor;
    }

    let filter = self
      .env
      .compile(&req.filter)
      .map_err(|err| ServiceError::invalid(err.to_string()))?;

    let mut batcher = Batcher::new(
      requested,
      self.config.default_page_size,
      self.config.max_page_size,
    );
    let mut records = Vec::with_capacity(requested.min(1024));
    let mut rounds = 0usize;
    let mut exhausted = false;

    while records.len() < requested && rounds < self.config.max_rounds {
      if cancel.is_cancelled() {
        if rounds == 0 {
          return Err(ServiceError::Cancelled);
        }
        // A partial page already exists; hand it back with a token
        // instead of discarding completed work.
        break;
      }

      let batch = batcher.next();
      let rows = self
        .store
        .scan_rows(cursor, batch as u32)
        .await
        .map_err(|err| ServiceError::from_store("list records", err))?;
      let fetched = rows.len();
      let mut produced = 0usize;
      let mut page_full = false;

      for row in rows {
        cursor = row.seq;
        let record =
          codec::decode(&row.data).map_err(|err| ServiceError::from_codec("list records", err))?;
        if filter
          .matches(&record)
          .map_err(|err| ServiceError::invalid(err.to_string()))?
        {
          produced += 1;
          records.push(record);
          if records.len() >= requested {
            page_full = true;
            break;
          }
        }
      }

      batcher.update(produced, fetched);
      rounds += 1;
      debug!(round = rounds, batch, fetched, produced, "scan_round");

      // A short fetch only proves exhaustion when every fetched row was
      // actually evaluated; a page that filled mid-batch leaves rows
      // behind for the next call.
      if !page_full && fetched < batch {
        exhausted = true;
        break;
      }
    }

    let next_page_token = if exhausted {
      None
    } else {
      Some(PageToken::new(cursor, req.filter.clone()).encode()?)
    };

    info!(
      returned = records.len(),
      rounds,
      exhausted,
      "records_listed"
    );
    Ok(ListResponse {
      records,
      next_page_token,
    })
  }
}
