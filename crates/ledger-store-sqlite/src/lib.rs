//! SQLite backend for the ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The handle carries no thread
//! affinity: it can be created on one task and driven from another.

mod config;
mod encode;
mod store;

pub mod error;

pub use config::{LedgerConfig, MEMORY_PATH};
pub use error::{Error, Result};
pub use store::{ScopedFuture, SqliteLedger};

#[cfg(test)]
mod tests;
