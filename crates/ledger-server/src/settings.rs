//! Server configuration, read from `config.toml` and `LEDGER_*` variables.

use std::path::{Path, PathBuf};

use ledger_store_sqlite::LedgerConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:   String,
  #[serde(default = "default_port")]
  pub port:   u16,
  #[serde(default)]
  pub ledger: LedgerConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8501 }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Resolve a `db_path` of the form `~` or `~/…` against `$HOME`. Other
/// paths, and every path when `$HOME` is unset, are returned unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => Path::new(&home).join(rest),
    _ => path.to_path_buf(),
  }
}
