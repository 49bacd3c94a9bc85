//! The schema descriptor: column name → declared storage type.
//!
//! The schema is configuration, not code. It drives table creation and is the
//! only source of identifiers that ever reach SQL text, so every name is
//! validated here before the schema can be constructed.

use serde::{Deserialize, Serialize};

use crate::{Error, Fields, Result, Value};

/// Name of the auto-assigned identity column every table carries.
pub const ID_COLUMN: &str = "id";

// ─── Column ──────────────────────────────────────────────────────────────────

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
  pub name:      String,
  /// Declared SQL type, e.g. `int` or `text`. Interpolated into the DDL.
  #[serde(rename = "type")]
  pub decl_type: String,
}

impl Column {
  pub fn new(name: impl Into<String>, decl_type: impl Into<String>) -> Self {
    Self { name: name.into(), decl_type: decl_type.into() }
  }

  pub fn affinity(&self) -> Affinity { Affinity::of(&self.decl_type) }
}

// ─── Affinity ────────────────────────────────────────────────────────────────

/// SQLite type affinity derived from a declared type (SQLite docs §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
  Integer,
  Text,
  Blob,
  Real,
  Numeric,
}

impl Affinity {
  pub fn of(decl_type: &str) -> Self {
    let t = decl_type.to_ascii_uppercase();
    if t.contains("INT") {
      Self::Integer
    } else if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
      Self::Text
    } else if t.is_empty() || t.contains("BLOB") {
      Self::Blob
    } else if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") {
      Self::Real
    } else {
      Self::Numeric
    }
  }

  /// Convert raw text input (a query-string value, a CSV cell) into the value
  /// the column would store. Non-numeric input to a numeric column stays text,
  /// as SQLite itself would keep it.
  pub fn coerce(self, raw: &str) -> Value {
    match self {
      Self::Text | Self::Blob => Value::Text(raw.to_owned()),
      Self::Integer | Self::Numeric => {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
          Value::Null
        } else if let Ok(i) = trimmed.parse::<i64>() {
          Value::Integer(i)
        } else if let Ok(r) = trimmed.parse::<f64>() {
          if r.fract() == 0.0 && r.abs() < i64::MAX as f64 {
            Value::Integer(r as i64)
          } else {
            Value::Real(r)
          }
        } else {
          Value::Text(raw.to_owned())
        }
      }
      Self::Real => {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
          Value::Null
        } else {
          trimmed
            .parse::<f64>()
            .map_or_else(|_| Value::Text(raw.to_owned()), Value::Real)
        }
      }
    }
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// Ordered list of data columns, excluding the identity column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schema {
  columns: Vec<Column>,
}

impl Schema {
  /// Validate and build a schema.
  ///
  /// Rejects names that are not plain identifiers, duplicate names, the
  /// reserved identity column, and declared types with characters outside
  /// `[A-Za-z0-9_ (),]`.
  pub fn new(columns: impl IntoIterator<Item = Column>) -> Result<Self> {
    let mut out: Vec<Column> = Vec::new();
    for column in columns {
      validate_identifier(&column.name)?;
      if column.name.eq_ignore_ascii_case(ID_COLUMN) {
        return Err(Error::ReservedColumn(column.name));
      }
      if !column
        .decl_type
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | ','))
      {
        return Err(Error::InvalidDeclType {
          column:    column.name,
          decl_type: column.decl_type,
        });
      }
      if out.iter().any(|c| c.name.eq_ignore_ascii_case(&column.name)) {
        return Err(Error::DuplicateColumn(column.name));
      }
      out.push(column);
    }
    Ok(Self { columns: out })
  }

  /// The default household-ledger schema.
  pub fn ledger() -> Self {
    Self {
      columns: default_columns(),
    }
  }

  pub fn columns(&self) -> &[Column] { &self.columns }

  pub fn column(&self, name: &str) -> Option<&Column> {
    self.columns.iter().find(|c| c.name == name)
  }

  /// `true` if `name` may appear in an insert or update.
  pub fn contains(&self, name: &str) -> bool { self.column(name).is_some() }

  /// `true` if `name` may appear in a select filter: any data column plus
  /// the identity column.
  pub fn is_filterable(&self, name: &str) -> bool {
    name == ID_COLUMN || self.contains(name)
  }

  /// Affinity of a filterable column; `None` if unknown.
  pub fn affinity(&self, name: &str) -> Option<Affinity> {
    if name == ID_COLUMN {
      return Some(Affinity::Integer);
    }
    self.column(name).map(Column::affinity)
  }

  /// Convert raw text for `column`; unknown columns keep the text as is.
  pub fn coerce(&self, column: &str, raw: &str) -> Value {
    self
      .affinity(column)
      .unwrap_or(Affinity::Text)
      .coerce(raw)
  }

  /// The recognised subset of `fields`, in iteration order. Unknown keys are
  /// dropped.
  pub fn recognize<'a>(&self, fields: &'a Fields) -> Vec<(&'a str, &'a Value)> {
    fields
      .iter()
      .filter(|(name, _)| {
        let known = self.contains(name);
        if !known {
          tracing::debug!(column = %name, "dropping unrecognised field");
        }
        known
      })
      .collect()
  }
}

impl<'de> Deserialize<'de> for Schema {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let columns = Vec::<Column>::deserialize(d)?;
    Schema::new(columns).map_err(serde::de::Error::custom)
  }
}

impl Default for Schema {
  fn default() -> Self { Self::ledger() }
}

pub(crate) fn default_columns() -> Vec<Column> {
  vec![
    Column::new("year", "int"),
    Column::new("month", "int"),
    Column::new("category", "text"),
    Column::new("detail", "text"),
    Column::new("value", "int"),
    Column::new("memo", "text"),
  ]
}

/// Accept only `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<()> {
  let mut chars = name.chars();
  let head_ok = chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
  if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
    Ok(())
  } else {
    Err(Error::InvalidIdentifier(name.to_owned()))
  }
}
