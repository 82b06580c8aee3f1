//! Record and execution payload types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored result record.
///
/// `name` and `created_time` are assigned by the server at creation and
/// never change afterwards. Everything else is mutable, either wholesale
/// or through a field-path merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
  /// Globally unique, server-generated identifier.
  #[serde(default)]
  pub name: String,

  /// Server-set creation timestamp. Always present on stored records;
  /// optional here so inbound records can omit it.
  #[serde(default)]
  pub created_time: Option<DateTime<Utc>>,

  /// Free-form string annotations.
  #[serde(default)]
  pub annotations: BTreeMap<String, String>,

  /// The executions this record wraps, in insertion order.
  #[serde(default)]
  pub executions: Vec<Execution>,
}

/// A tagged execution payload owned by a [`Record`].
///
/// Closed sum type: adding a variant is a compile-time-checked change
/// everywhere executions are consumed. `Unknown` is the explicit unset
/// discriminant and what decoders fall back to for tags introduced by
/// newer writers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Execution {
  TaskRun(TaskRun),
  #[default]
  #[serde(other)]
  Unknown,
}

impl Execution {
  /// Returns the task-run payload, if this execution carries one.
  pub fn as_task_run(&self) -> Option<&TaskRun> {
    match self {
      Execution::TaskRun(t) => Some(t),
      Execution::Unknown => None,
    }
  }
}

/// A task-run payload, already converted into the record schema by the
/// upstream producer. Every sub-field is optional on the wire; decoding
/// never fails on absent fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
  #[serde(default)]
  pub api_version: String,
  #[serde(default)]
  pub kind: String,
  #[serde(default)]
  pub metadata: ObjectMeta,
  #[serde(default)]
  pub status: TaskRunStatus,
}

/// Object metadata carried by a task-run payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub namespace: String,
  #[serde(default)]
  pub labels: BTreeMap<String, String>,
  #[serde(default)]
  pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRunStatus {
  #[serde(default)]
  pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
  #[serde(default, rename = "type")]
  pub type_: String,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub reason: String,
  #[serde(default)]
  pub message: String,
}

impl Record {
  /// The first task-run payload among this record's executions, if any.
  pub fn first_task_run(&self) -> Option<&TaskRun> {
    self.executions.iter().find_map(Execution::as_task_run)
  }
}
