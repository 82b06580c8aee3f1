//! Field-path merge for partial updates.
//!
//! The mutable fields of a record are enumerated in a static table of
//! typed copy accessors. There is no reflection: an update naming a path
//! outside the table is rejected before any field is touched, and a
//! repeated field named by a path is replaced wholesale.

use crate::record::Record;

/// Copies one field subtree from `src` onto `dst`.
pub type CopyFn = fn(dst: &mut Record, src: &Record);

fn copy_annotations(dst: &mut Record, src: &Record) {
  dst.annotations = src.annotations.clone();
}

fn copy_executions(dst: &mut Record, src: &Record) {
  dst.executions = src.executions.clone();
}

/// The mutable field paths a partial update may name. Identity fields
/// (`name`, `created_time`) are deliberately absent.
const FIELD_PATHS: &[(&str, CopyFn)] = &[
  ("annotations", copy_annotations),
  ("executions", copy_executions),
];

/// Errors raised while merging an incoming record into an existing one.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
  /// The update named a field path outside the schema.
  #[error("unknown field path: {path}")]
  UnknownPath { path: String },
}

/// Look up the copy accessor for a field path. Paths are matched exactly
/// and case-sensitively.
pub fn field_path(path: &str) -> Option<CopyFn> {
  FIELD_PATHS
    .iter()
    .find(|(name, _)| *name == path)
    .map(|(_, copy)| *copy)
}

/// Compute the record to persist for an update of `existing` with
/// `incoming`.
///
/// - `paths == None`: full replacement; every mutable field comes from
///   `incoming`, while `name` and `created_time` are pinned from
///   `existing`.
/// - `paths == Some([])`: no-op; `existing` is returned unchanged.
/// - `paths == Some([p1..pn])`: each named subtree is copied from
///   `incoming` onto `existing`, using whatever value `incoming` holds
///   there (its zero value when unset). All paths are validated before
///   any is applied, so an unknown path mutates nothing.
pub fn merge(
  existing: &Record,
  incoming: &Record,
  paths: Option<&[String]>,
) -> Result<Record, MergeError> {
  match paths {
    None => {
      let mut merged = incoming.clone();
      merged.name = existing.name.clone();
      merged.created_time = existing.created_time;
      Ok(merged)
    }
    Some([]) => Ok(existing.clone()),
    Some(paths) => {
      let mut copies = Vec::with_capacity(paths.len());
      for path in paths {
        let copy = field_path(path).ok_or_else(|| MergeError::UnknownPath {
          path: path.clone(),
        })?;
        copies.push(copy);
      }
      let mut merged = existing.clone();
      for copy in copies {
        copy(&mut merged, incoming);
      }
      Ok(merged)
    }
  }
}
