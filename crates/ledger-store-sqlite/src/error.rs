//! Error type for `ledger-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ledger_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("csv error: {0}")]
  Csv(#[from] ledger_csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// An operation was attempted before `open` or after `close`.
  #[error("ledger is not open")]
  NotOpen,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
