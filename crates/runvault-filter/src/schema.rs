//! The static schema of fields a filter may reference.
//!
//! Each supported path maps to a typed accessor over a record. There is
//! no reflection and no case-insensitive fallback: a path missing from
//! this table is an unknown identifier at compile time.
//!
//! Record fields are bound at the top level (`name`, `created_time`,
//! `annotations`). Task-run payload fields (`api_version`, `kind`,
//! `metadata.*`) resolve against the record's first task-run execution;
//! a record without one yields the field's zero value, so such filters
//! stay well-typed over mixed data.

use runvault_record::{Record, TaskRun};

use crate::value::{Value, ValueType};

pub(crate) type Accessor = fn(&Record) -> Value;

pub(crate) struct FieldSpec {
  pub path: &'static str,
  pub value_type: ValueType,
  pub get: Accessor,
}

fn task_run(record: &Record) -> Option<&TaskRun> {
  record.first_task_run()
}

fn get_name(r: &Record) -> Value {
  Value::String(r.name.clone())
}

// RFC-3339 in UTC; lexicographic order on these strings is
// chronological order.
fn get_created_time(r: &Record) -> Value {
  Value::String(
    r.created_time
      .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
      .unwrap_or_default(),
  )
}

fn get_annotations(r: &Record) -> Value {
  Value::Map(r.annotations.clone())
}

fn get_api_version(r: &Record) -> Value {
  Value::String(task_run(r).map(|t| t.api_version.clone()).unwrap_or_default())
}

fn get_kind(r: &Record) -> Value {
  Value::String(task_run(r).map(|t| t.kind.clone()).unwrap_or_default())
}

fn get_metadata_name(r: &Record) -> Value {
  Value::String(
    task_run(r)
      .map(|t| t.metadata.name.clone())
      .unwrap_or_default(),
  )
}

fn get_metadata_namespace(r: &Record) -> Value {
  Value::String(
    task_run(r)
      .map(|t| t.metadata.namespace.clone())
      .unwrap_or_default(),
  )
}

fn get_metadata_labels(r: &Record) -> Value {
  Value::Map(
    task_run(r)
      .map(|t| t.metadata.labels.clone())
      .unwrap_or_default(),
  )
}

const SCHEMA: &[FieldSpec] = &[
  FieldSpec {
    path: "name",
    value_type: ValueType::String,
    get: get_name,
  },
  FieldSpec {
    path: "created_time",
    value_type: ValueType::String,
    get: get_created_time,
  },
  FieldSpec {
    path: "annotations",
    value_type: ValueType::Map,
    get: get_annotations,
  },
  FieldSpec {
    path: "api_version",
    value_type: ValueType::String,
    get: get_api_version,
  },
  FieldSpec {
    path: "kind",
    value_type: ValueType::String,
    get: get_kind,
  },
  FieldSpec {
    path: "metadata.name",
    value_type: ValueType::String,
    get: get_metadata_name,
  },
  FieldSpec {
    path: "metadata.namespace",
    value_type: ValueType::String,
    get: get_metadata_namespace,
  },
  FieldSpec {
    path: "metadata.labels",
    value_type: ValueType::Map,
    get: get_metadata_labels,
  },
];

/// Exact, case-sensitive lookup of a field path.
pub(crate) fn lookup(path: &str) -> Option<&'static FieldSpec> {
  SCHEMA.iter().find(|spec| spec.path == path)
}
