//! Encoded CSV → insert payloads.

use encoding_rs::Encoding;
use ledger_core::{Fields, Schema, Value};

use crate::{Error, Result};

// ─── Mapping ─────────────────────────────────────────────────────────────────

/// Which CSV header feeds which ledger column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMapping {
  /// `(source header, target column)` pairs.
  pairs: Vec<(String, String)>,
}

impl ImportMapping {
  pub fn new<I, S, T>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (S, T)>,
    S: Into<String>,
    T: Into<String>,
  {
    Self {
      pairs: pairs
        .into_iter()
        .map(|(s, t)| (s.into(), t.into()))
        .collect(),
    }
  }

  /// The layout of the bank/card statement exports the ledger is fed from.
  /// Header names are matched exactly, including case.
  pub fn external() -> Self {
    Self::new([
      ("Year", "year"),
      ("Month", "month"),
      ("Category", "category"),
      ("Amount", "value"),
    ])
  }

  /// Every schema column mapped from a header of the same name.
  pub fn identity(schema: &Schema) -> Self {
    Self::new(schema.columns().iter().map(|c| (c.name.clone(), c.name.clone())))
  }

  pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
    self.pairs.iter().map(|(s, t)| (s.as_str(), t.as_str()))
  }

  /// Pick a mapping for `headers`: the external layout when all of its
  /// headers are present, otherwise the schema columns the header names.
  pub fn detect(headers: &csv::StringRecord, schema: &Schema) -> Result<Self> {
    let has = |name: &str| headers.iter().any(|h| h == name);

    let external = Self::external();
    if external.pairs().all(|(source, _)| has(source)) {
      return Ok(external);
    }

    let present: Vec<(String, String)> = Self::identity(schema)
      .pairs
      .into_iter()
      .filter(|(source, _)| has(source))
      .collect();
    if present.is_empty() {
      return Err(Error::UnmappedHeader);
    }
    Ok(Self { pairs: present })
  }

  /// Resolve each source header to its position in `headers`.
  fn resolve(&self, headers: &csv::StringRecord) -> Result<Vec<(usize, String)>> {
    self
      .pairs
      .iter()
      .map(|(source, target)| {
        headers
          .iter()
          .position(|h| h == source)
          .map(|idx| (idx, target.clone()))
          .ok_or_else(|| Error::MissingColumn(source.clone()))
      })
      .collect()
  }
}

// ─── Reading ─────────────────────────────────────────────────────────────────

/// Decode `bytes` from `encoding`. A leading BOM overrides `encoding`.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
  let (text, used, had_errors) = encoding.decode(bytes);
  if had_errors {
    return Err(Error::Undecodable(used.name()));
  }
  Ok(text.into_owned())
}

/// Parse CSV `bytes` into one [`Fields`] payload per data line.
///
/// With `mapping = None` the mapping is detected from the header. Empty
/// cells become NULL, so an empty string does not survive a round trip.
/// Other cells are coerced by the target column's affinity; text cells are
/// taken verbatim, whitespace included.
pub fn read_fields(
  bytes:    &[u8],
  encoding: &'static Encoding,
  schema:   &Schema,
  mapping:  Option<&ImportMapping>,
) -> Result<Vec<Fields>> {
  let text = decode(bytes, encoding)?;
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .from_reader(text.as_bytes());

  let headers = reader.headers()?.clone();
  let mapping = match mapping {
    Some(m) => m.clone(),
    None => ImportMapping::detect(&headers, schema)?,
  };
  let columns = mapping.resolve(&headers)?;
  tracing::debug!(mapping = ?mapping.pairs, "resolved import mapping");

  let mut out = Vec::new();
  for record in reader.records() {
    let record = record?;
    let fields: Fields = columns
      .iter()
      .map(|(idx, target)| {
        // Text cells keep their padding; numeric coercion trims on its own.
        let value = match record.get(*idx) {
          None | Some("") => Value::Null,
          Some(cell) => schema.coerce(target, cell),
        };
        (target.clone(), value)
      })
      .collect();
    out.push(fields);
  }
  Ok(out)
}
