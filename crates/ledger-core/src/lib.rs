//! Core types and trait definitions for the ledger.
//!
//! This crate has no HTTP or database dependencies. It owns
//! the schema descriptor, the field/filter mappings validated against it, and
//! the SQL text builder that every storage backend binds against.

pub mod error;
pub mod frame;
pub mod record;
pub mod schema;
pub mod store;
pub mod table;
pub mod value;

pub use error::{Error, Result};
pub use frame::Frame;
pub use record::{NewRecord, Record, Row};
pub use schema::{Affinity, Column, ID_COLUMN, Schema};
pub use store::LedgerStore;
pub use table::{Statement, Table};
pub use value::{FilterValue, Fields, Filters, Value};
