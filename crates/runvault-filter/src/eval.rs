//! Static checking and per-record evaluation of parsed filters.

use runvault_record::Record;

use crate::FilterError;
use crate::expr::{BinaryOp, Expr, StrMethod, UnaryOp};
use crate::schema;
use crate::value::{Value, ValueType};

fn check_err(message: impl Into<String>) -> FilterError {
  FilterError::Check {
    message: message.into(),
  }
}

fn eval_err(message: impl Into<String>) -> FilterError {
  FilterError::Eval {
    message: message.into(),
  }
}

/// Type-check an expression against the record schema, returning its
/// static type. All unknown identifiers and operand type mismatches are
/// caught here, before any row is read.
pub(crate) fn check(expr: &Expr) -> Result<ValueType, FilterError> {
  match expr {
    Expr::Literal(value) => Ok(value.value_type()),
    Expr::Field(path) => schema::lookup(path)
      .map(|spec| spec.value_type)
      .ok_or_else(|| check_err(format!("unknown field '{path}'"))),
    Expr::Index { recv, key } => {
      let recv_type = check(recv)?;
      if recv_type != ValueType::Map {
        return Err(check_err(format!("cannot index into {recv_type} value")));
      }
      let key_type = check(key)?;
      if key_type != ValueType::String {
        return Err(check_err(format!("map key must be string, got {key_type}")));
      }
      Ok(ValueType::String)
    }
    Expr::Method { recv, method, arg } => {
      let recv_type = check(recv)?;
      let arg_type = check(arg)?;
      if recv_type != ValueType::String || arg_type != ValueType::String {
        return Err(check_err(format!(
          "{}() requires string operands, got {recv_type} and {arg_type}",
          method.name()
        )));
      }
      Ok(ValueType::Bool)
    }
    Expr::Unary { op: UnaryOp::Not, expr } => {
      let inner = check(expr)?;
      if inner != ValueType::Bool {
        return Err(check_err(format!("'!' requires a bool operand, got {inner}")));
      }
      Ok(ValueType::Bool)
    }
    Expr::Binary { op, lhs, rhs } => {
      let lt = check(lhs)?;
      let rt = check(rhs)?;
      match op {
        BinaryOp::And | BinaryOp::Or => {
          if lt != ValueType::Bool || rt != ValueType::Bool {
            return Err(check_err(format!(
              "'{}' requires bool operands, got {lt} and {rt}",
              op.symbol()
            )));
          }
          Ok(ValueType::Bool)
        }
        BinaryOp::Eq | BinaryOp::Ne => {
          if lt != rt || lt == ValueType::Map {
            return Err(check_err(format!(
              "cannot compare {lt} and {rt} with '{}'",
              op.symbol()
            )));
          }
          Ok(ValueType::Bool)
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
          if lt != rt || !matches!(lt, ValueType::Int | ValueType::String) {
            return Err(check_err(format!(
              "'{}' requires two ints or two strings, got {lt} and {rt}",
              op.symbol()
            )));
          }
          Ok(ValueType::Bool)
        }
      }
    }
  }
}

/// Evaluate an expression against one record.
pub(crate) fn eval(expr: &Expr, record: &Record) -> Result<Value, FilterError> {
  match expr {
    Expr::Literal(value) => Ok(value.clone()),
    Expr::Field(path) => schema::lookup(path)
      .map(|spec| (spec.get)(record))
      .ok_or_else(|| eval_err(format!("unknown field '{path}'"))),
    Expr::Index { recv, key } => {
      match (eval(recv, record)?, eval(key, record)?) {
        // Absent keys read as the empty string so a well-typed filter
        // never fails on sparse data.
        (Value::Map(map), Value::String(key)) => {
          Ok(Value::String(map.get(&key).cloned().unwrap_or_default()))
        }
        (recv, key) => Err(eval_err(format!(
          "cannot index {} with {}",
          recv.value_type(),
          key.value_type()
        ))),
      }
    }
    Expr::Method { recv, method, arg } => {
      match (eval(recv, record)?, eval(arg, record)?) {
        (Value::String(recv), Value::String(arg)) => Ok(Value::Bool(match method {
          StrMethod::StartsWith => recv.starts_with(&arg),
          StrMethod::EndsWith => recv.ends_with(&arg),
          StrMethod::Contains => recv.contains(&arg),
        })),
        (recv, arg) => Err(eval_err(format!(
          "{}() requires string operands, got {} and {}",
          method.name(),
          recv.value_type(),
          arg.value_type()
        ))),
      }
    }
    Expr::Unary { op: UnaryOp::Not, expr } => match eval(expr, record)? {
      Value::Bool(b) => Ok(Value::Bool(!b)),
      value => Err(eval_err(format!(
        "'!' requires a bool operand, got {}",
        value.value_type()
      ))),
    },
    Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, record),
  }
}

fn eval_binary(
  op: BinaryOp,
  lhs: &Expr,
  rhs: &Expr,
  record: &Record,
) -> Result<Value, FilterError> {
  // && and || short-circuit.
  if matches!(op, BinaryOp::And | BinaryOp::Or) {
    let left = eval_bool(lhs, record)?;
    return match (op, left) {
      (BinaryOp::And, false) => Ok(Value::Bool(false)),
      (BinaryOp::Or, true) => Ok(Value::Bool(true)),
      _ => Ok(Value::Bool(eval_bool(rhs, record)?)),
    };
  }

  let left = eval(lhs, record)?;
  let right = eval(rhs, record)?;
  let result = match (op, &left, &right) {
    (BinaryOp::Eq, Value::Bool(a), Value::Bool(b)) => a == b,
    (BinaryOp::Ne, Value::Bool(a), Value::Bool(b)) => a != b,
    (BinaryOp::Eq, Value::Int(a), Value::Int(b)) => a == b,
    (BinaryOp::Ne, Value::Int(a), Value::Int(b)) => a != b,
    (BinaryOp::Lt, Value::Int(a), Value::Int(b)) => a < b,
    (BinaryOp::Le, Value::Int(a), Value::Int(b)) => a <= b,
    (BinaryOp::Gt, Value::Int(a), Value::Int(b)) => a > b,
    (BinaryOp::Ge, Value::Int(a), Value::Int(b)) => a >= b,
    (BinaryOp::Eq, Value::String(a), Value::String(b)) => a == b,
    (BinaryOp::Ne, Value::String(a), Value::String(b)) => a != b,
    (BinaryOp::Lt, Value::String(a), Value::String(b)) => a < b,
    (BinaryOp::Le, Value::String(a), Value::String(b)) => a <= b,
    (BinaryOp::Gt, Value::String(a), Value::String(b)) => a > b,
    (BinaryOp::Ge, Value::String(a), Value::String(b)) => a >= b,
    _ => {
      return Err(eval_err(format!(
        "cannot apply '{}' to {} and {}",
        op.symbol(),
        left.value_type(),
        right.value_type()
      )));
    }
  };
  Ok(Value::Bool(result))
}

fn eval_bool(expr: &Expr, record: &Record) -> Result<bool, FilterError> {
  match eval(expr, record)? {
    Value::Bool(b) => Ok(b),
    value => Err(eval_err(format!(
      "expected bool operand, got {}",
      value.value_type()
    ))),
  }
}
