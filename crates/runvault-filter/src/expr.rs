//! Filter expression AST.

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
  Literal(Value),
  /// A dotted field path resolved against the record schema.
  Field(String),
  /// Map indexing, e.g. `annotations["team"]`.
  Index { recv: Box<Expr>, key: Box<Expr> },
  /// A string method call, e.g. `name.endsWith("run")`.
  Method {
    recv: Box<Expr>,
    method: StrMethod,
    arg: Box<Expr>,
  },
  Unary { op: UnaryOp, expr: Box<Expr> },
  Binary {
    op: BinaryOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrMethod {
  StartsWith,
  EndsWith,
  Contains,
}

impl StrMethod {
  pub(crate) fn from_name(name: &str) -> Option<Self> {
    match name {
      "startsWith" => Some(StrMethod::StartsWith),
      "endsWith" => Some(StrMethod::EndsWith),
      "contains" => Some(StrMethod::Contains),
      _ => None,
    }
  }

  pub(crate) fn name(self) -> &'static str {
    match self {
      StrMethod::StartsWith => "startsWith",
      StrMethod::EndsWith => "endsWith",
      StrMethod::Contains => "contains",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
  Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  And,
  Or,
}

impl BinaryOp {
  pub(crate) fn symbol(self) -> &'static str {
    match self {
      BinaryOp::Eq => "==",
      BinaryOp::Ne => "!=",
      BinaryOp::Lt => "<",
      BinaryOp::Le => "<=",
      BinaryOp::Gt => ">",
      BinaryOp::Ge => ">=",
      BinaryOp::And => "&&",
      BinaryOp::Or => "||",
    }
  }
}
