//! Error types for `ledger-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A table or column name that is not a plain SQL identifier.
  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("invalid declared type for column {column}: {decl_type:?}")]
  InvalidDeclType { column: String, decl_type: String },

  #[error("duplicate column in schema: {0}")]
  DuplicateColumn(String),

  /// The identity column is managed by the store and cannot be declared.
  #[error("column {0:?} is reserved for the row identity")]
  ReservedColumn(String),

  #[error("column {0} is missing from the row")]
  MissingColumn(String),

  #[error("unexpected NULL in column {0}")]
  UnexpectedNull(String),

  #[error("column {column}: expected {expected}, found {found}")]
  TypeMismatch {
    column:   String,
    expected: &'static str,
    found:    &'static str,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
