//! Delimited-text codec for the ledger.
//!
//! Converts a [`Frame`](ledger_core::Frame) into header-plus-rows CSV bytes in
//! a configurable text encoding, and converts such bytes back into insert
//! payloads. Pure synchronous; no database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use ledger_core::Schema;
//!
//! let sjis = ledger_csv::encoding("shift_jis").unwrap();
//! let bytes = b"Year,Month,Category,Amount\n2024,3,rent,1200\n";
//! let rows = ledger_csv::read_fields(bytes, sjis, &Schema::ledger(), None).unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

pub mod error;
mod parse;
mod serialize;

pub use encoding_rs::Encoding;
pub use error::{Error, Result};
pub use parse::{ImportMapping, decode, read_fields};
pub use serialize::{encode, write_frame};

/// Encoding used when configuration does not name one; the one spreadsheet
/// tooling in a Japanese locale opens without prompting.
pub const DEFAULT_ENCODING: &str = "shift_jis";

/// Look up an encoding by its WHATWG label (`shift_jis`, `utf-8`, `cp1252`…).
pub fn encoding(label: &str) -> Result<&'static Encoding> {
  Encoding::for_label(label.trim().as_bytes())
    .ok_or_else(|| Error::UnknownEncoding(label.to_owned()))
}
