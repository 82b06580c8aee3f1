//! The filter environment: compile once, evaluate per record.

use runvault_record::Record;

use crate::FilterError;
use crate::eval;
use crate::expr::Expr;
use crate::parse;
use crate::token;
use crate::value::{Value, ValueType};

/// The environment filters are compiled against.
///
/// Constructed explicitly and owned by whoever serves queries (no
/// global state); lives as long as the owning service instance.
#[derive(Debug, Default)]
pub struct FilterEnv {}

impl FilterEnv {
  pub fn new() -> Self {
    Self {}
  }

  /// Compile a filter expression into an executable program.
  ///
  /// The empty string compiles to a program matching every record. Any
  /// syntax error, unknown identifier, operand type mismatch, or
  /// non-boolean result type fails here, before a single row is read.
  pub fn compile(&self, filter: &str) -> Result<Filter, FilterError> {
    if filter.is_empty() {
      return Ok(Filter { expr: None });
    }
    let tokens = token::tokenize(filter)?;
    let expr = parse::parse(tokens)?;
    let result_type = eval::check(&expr)?;
    if result_type != ValueType::Bool {
      return Err(FilterError::Check {
        message: format!("filter must evaluate to bool, got {result_type}"),
      });
    }
    Ok(Filter { expr: Some(expr) })
  }
}

/// A compiled filter program.
#[derive(Debug)]
pub struct Filter {
  /// `None` is the match-all program produced by an empty filter.
  expr: Option<Expr>,
}

impl Filter {
  /// Evaluate this filter against one record.
  pub fn matches(&self, record: &Record) -> Result<bool, FilterError> {
    let Some(expr) = &self.expr else {
      return Ok(true);
    };
    match eval::eval(expr, record)? {
      Value::Bool(b) => Ok(b),
      value => Err(FilterError::Eval {
        message: format!("filter produced {}, expected bool", value.value_type()),
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use runvault_record::{Execution, ObjectMeta, Record, TaskRun};

  use super::*;

  fn task_run_record(api_version: &str, name: &str) -> Record {
    let mut record = Record {
      name: format!("record-for-{name}"),
      ..Record::default()
    };
    record
      .annotations
      .insert("team".to_string(), "ci".to_string());
    record.executions.push(Execution::TaskRun(TaskRun {
      api_version: api_version.to_string(),
      kind: "TaskRun".to_string(),
      metadata: ObjectMeta {
        name: name.to_string(),
        namespace: "default".to_string(),
        ..ObjectMeta::default()
      },
      ..TaskRun::default()
    }));
    record
  }

  fn matches(filter: &str, record: &Record) -> bool {
    FilterEnv::new()
      .compile(filter)
      .unwrap()
      .matches(record)
      .unwrap()
  }

  #[test]
  fn empty_filter_matches_everything() {
    assert!(matches("", &Record::default()));
    assert!(matches("", &task_run_record("v1beta1", "mytaskrun")));
  }

  #[test]
  fn matches_payload_api_version() {
    let record = task_run_record("v1beta1", "mytaskrun");
    assert!(matches(r#"api_version == "v1beta1""#, &record));
    assert!(!matches(r#"api_version == "v1alpha1""#, &record));
  }

  #[test]
  fn string_methods_use_literal_affixes() {
    let record = task_run_record("v1beta1", "mytaskrun");
    assert!(matches(r#"metadata.name.endsWith("run")"#, &record));
    assert!(!matches(r#"metadata.name.endsWith("runs")"#, &record));
    assert!(matches(r#"metadata.name.startsWith("my")"#, &record));
    assert!(matches(r#"metadata.name.contains("task")"#, &record));
  }

  #[test]
  fn record_name_is_distinct_from_payload_name() {
    let record = task_run_record("v1beta1", "mytaskrun");
    assert!(matches(r#"name.startsWith("record-for-")"#, &record));
    assert!(!matches(r#"name == "mytaskrun""#, &record));
  }

  #[test]
  fn boolean_operators_combine_and_short_circuit() {
    let record = task_run_record("v1beta1", "mytaskrun");
    assert!(matches(
      r#"api_version == "v1" || kind == "TaskRun""#,
      &record
    ));
    assert!(!matches(
      r#"api_version == "v1" && kind == "TaskRun""#,
      &record
    ));
    assert!(matches(r#"!(api_version == "v1")"#, &record));
  }

  #[test]
  fn annotation_index_reads_empty_for_absent_keys() {
    let record = task_run_record("v1beta1", "mytaskrun");
    assert!(matches(r#"annotations["team"] == "ci""#, &record));
    assert!(matches(r#"annotations["missing"] == """#, &record));
  }

  #[test]
  fn payload_fields_read_zero_values_without_executions() {
    let record = Record::default();
    assert!(matches(r#"api_version == """#, &record));
    assert!(!matches(r#"metadata.name.endsWith("run")"#, &record));
  }

  #[test]
  fn compile_rejects_unknown_identifier() {
    let err = FilterEnv::new().compile("unexistfield == \"x\"").unwrap_err();
    assert!(matches!(err, FilterError::Check { .. }));
  }

  #[test]
  fn compile_is_case_sensitive() {
    let err = FilterEnv::new()
      .compile(r#"Metadata.name == "x""#)
      .unwrap_err();
    assert!(matches!(err, FilterError::Check { .. }));
  }

  #[test]
  fn compile_rejects_type_mismatch() {
    let err = FilterEnv::new().compile("name == 3").unwrap_err();
    assert!(matches!(err, FilterError::Check { .. }));
  }

  #[test]
  fn compile_rejects_non_boolean_filter() {
    let err = FilterEnv::new().compile("name").unwrap_err();
    assert!(matches!(err, FilterError::Check { .. }));
  }

  #[test]
  fn compile_rejects_syntax_errors() {
    let err = FilterEnv::new().compile(r#"api_version"("#).unwrap_err();
    assert!(matches!(err, FilterError::Syntax { .. }));
  }
}
