//! Runvault Record
//!
//! This crate defines the stored [`Record`] and its owned [`Execution`]
//! payloads, the serde-based blob codec used to persist them, and the
//! field-path merge used by partial updates.

pub mod codec;
pub mod merge;
mod record;

pub use codec::CodecError;
pub use merge::MergeError;
pub use record::{Condition, Execution, ObjectMeta, Record, TaskRun, TaskRunStatus};
