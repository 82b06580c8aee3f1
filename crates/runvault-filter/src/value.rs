//! Runtime values and their static types.

use std::collections::BTreeMap;

/// A value produced while evaluating a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Bool(bool),
  Int(i64),
  String(String),
  /// String-to-string maps (annotations, labels).
  Map(BTreeMap<String, String>),
}

impl Value {
  pub fn value_type(&self) -> ValueType {
    match self {
      Value::Bool(_) => ValueType::Bool,
      Value::Int(_) => ValueType::Int,
      Value::String(_) => ValueType::String,
      Value::Map(_) => ValueType::Map,
    }
  }
}

/// The static type of an expression, used by the compile-time check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
  Bool,
  Int,
  String,
  Map,
}

impl ValueType {
  pub fn name(self) -> &'static str {
    match self {
      ValueType::Bool => "bool",
      ValueType::Int => "int",
      ValueType::String => "string",
      ValueType::Map => "map",
    }
  }
}

impl std::fmt::Display for ValueType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}
