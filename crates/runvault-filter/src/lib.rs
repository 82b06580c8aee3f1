//! Runvault Filter
//!
//! This crate compiles boolean filter expressions against the record
//! schema and evaluates them one record at a time. Compilation (lexing,
//! parsing, static type checking) happens once per query; evaluation is
//! pure and never touches storage.
//!
//! The language is a small expression grammar: dotted field paths over
//! a static record schema, string/int/bool literals, comparison and
//! logical operators, map indexing, and the string methods
//! `startsWith`, `endsWith`, and `contains`.

mod env;
mod eval;
mod expr;
mod parse;
mod schema;
mod token;
mod value;

pub use env::{Filter, FilterEnv};
pub use value::{Value, ValueType};

/// Errors raised while compiling or evaluating a filter.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
  /// The expression could not be tokenized or parsed.
  #[error("filter syntax error: {message}")]
  Syntax { message: String },

  /// The expression parsed but failed the static check (unknown
  /// identifier, type mismatch, or a non-boolean result type).
  #[error("invalid filter: {message}")]
  Check { message: String },

  /// Evaluation against a record failed. A well-typed filter should
  /// never hit this; it is a caller error, not a data error.
  #[error("failed to evaluate filter: {message}")]
  Eval { message: String },
}
