//! Error types for the ledger-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("unknown text encoding: {0:?}")]
  UnknownEncoding(String),

  /// The text holds characters the target encoding cannot represent.
  #[error("text cannot be encoded as {0}")]
  Unencodable(&'static str),

  #[error("input is not valid {0}")]
  Undecodable(&'static str),

  #[error("missing column in header: {0}")]
  MissingColumn(String),

  #[error("no header column matches the import mapping or the schema")]
  UnmappedHeader,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
