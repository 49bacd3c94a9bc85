//! [`LedgerConfig`]: where the ledger lives and what its table looks like.

use std::path::PathBuf;

use ledger_core::{Column, Schema, Table};
use serde::{Deserialize, Serialize};

use crate::Result;

/// `db_path` value that selects a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Data-layer configuration, usually the `[ledger]` section of `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
  pub db_path:         PathBuf,
  pub table:           String,
  /// Data columns, in table order; the identity column is implicit.
  pub columns:         Vec<Column>,
  /// WHATWG label of the CSV export/import encoding.
  pub export_encoding: String,
}

impl Default for LedgerConfig {
  fn default() -> Self {
    Self {
      db_path:         PathBuf::from("ledger.db"),
      table:           "ledger".to_owned(),
      columns:         Schema::ledger().columns().to_vec(),
      export_encoding: ledger_csv::DEFAULT_ENCODING.to_owned(),
    }
  }
}

impl LedgerConfig {
  /// Default layout over an in-memory database.
  ///
  /// The database lives only as long as one open connection, so data does
  /// not survive `close`.
  pub fn in_memory() -> Self {
    Self {
      db_path: PathBuf::from(MEMORY_PATH),
      ..Self::default()
    }
  }

  pub fn is_memory(&self) -> bool { self.db_path.as_os_str() == MEMORY_PATH }

  /// Validate the table name and columns.
  pub fn table(&self) -> Result<Table> {
    let schema = Schema::new(self.columns.iter().cloned())?;
    Ok(Table::new(self.table.clone(), schema)?)
  }

  pub fn encoding(&self) -> Result<&'static ledger_csv::Encoding> {
    Ok(ledger_csv::encoding(&self.export_encoding)?)
  }
}
