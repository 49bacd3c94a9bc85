//! Frame → encoded CSV.

use encoding_rs::Encoding;
use ledger_core::Frame;

use crate::{Error, Result};

/// Write `frame` as CSV (header row, then one line per row) in `encoding`.
///
/// NULL cells are written as empty fields.
pub fn write_frame(frame: &Frame, encoding: &'static Encoding) -> Result<Vec<u8>> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(&frame.columns)?;
  for row in &frame.rows {
    writer.write_record(row.iter().map(ToString::to_string))?;
  }
  let utf8 = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
  let text = String::from_utf8(utf8).map_err(|_| Error::Undecodable("UTF-8"))?;
  encode(&text, encoding)
}

/// Encode `text`, failing rather than substituting unmappable characters.
pub fn encode(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
  let (bytes, _, had_errors) = encoding.encode(text);
  if had_errors {
    return Err(Error::Unencodable(encoding.name()));
  }
  Ok(bytes.into_owned())
}
