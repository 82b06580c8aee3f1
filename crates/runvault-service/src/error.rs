//! Caller-visible error taxonomy.

use runvault_record::CodecError;
use runvault_store::StoreError;

/// Errors returned by result service operations.
///
/// Every failed call maps to exactly one of these; a failed call never
/// leaves a partially mutated record behind.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
  /// No record exists under the given name (including names whose
  /// record was deleted earlier).
  #[error("record not found: {name}")]
  NotFound { name: String },

  /// Create collided with an existing identifier after exhausting its
  /// one regeneration retry.
  #[error("record already exists: {name}")]
  AlreadyExists { name: String },

  /// The caller supplied a bad filter, an unknown merge path, or a
  /// malformed or mismatched page token.
  #[error("invalid argument: {message}")]
  InvalidArgument { message: String },

  /// The call was cancelled before any useful partial result existed.
  #[error("operation cancelled")]
  Cancelled,

  /// Storage or serialization failure.
  #[error("internal error: {message}")]
  Internal { message: String },
}

impl ServiceError {
  pub(crate) fn invalid(message: impl Into<String>) -> Self {
    ServiceError::InvalidArgument {
      message: message.into(),
    }
  }

  pub(crate) fn internal(operation: &str, err: impl std::fmt::Display) -> Self {
    ServiceError::Internal {
      message: format!("{operation}: {err}"),
    }
  }

  /// Wrap a store error, attaching the operation for context.
  pub(crate) fn from_store(operation: &str, err: StoreError) -> Self {
    match err {
      StoreError::Duplicate { name } => ServiceError::AlreadyExists { name },
      StoreError::NotFound { name } => ServiceError::NotFound { name },
      err => ServiceError::internal(operation, err),
    }
  }

  pub(crate) fn from_codec(operation: &str, err: CodecError) -> Self {
    ServiceError::internal(operation, err)
  }
}
