//! Rows as returned by a select, and the typed ledger record view.

use serde::{Deserialize, Serialize};

use crate::{Error, Fields, Result, Value};

/// One selected row: the store-assigned identity plus every other column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
  pub id:     i64,
  #[serde(flatten)]
  pub fields: Fields,
}

impl Row {
  pub fn get(&self, column: &str) -> Option<&Value> { self.fields.get(column) }
}

// ─── Typed record ────────────────────────────────────────────────────────────

/// A ledger entry under the default schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  pub id:       i64,
  pub year:     Option<i64>,
  pub month:    Option<i64>,
  pub category: Option<String>,
  pub detail:   Option<String>,
  pub value:    Option<i64>,
  pub memo:     Option<String>,
}

impl TryFrom<&Row> for Record {
  type Error = Error;

  fn try_from(row: &Row) -> Result<Self> {
    Ok(Self {
      id:       row.id,
      year:     int_field(row, "year")?,
      month:    int_field(row, "month")?,
      category: text_field(row, "category")?,
      detail:   text_field(row, "detail")?,
      value:    int_field(row, "value")?,
      memo:     text_field(row, "memo")?,
    })
  }
}

fn int_field(row: &Row, column: &str) -> Result<Option<i64>> {
  match row.get(column) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Integer(i)) => Ok(Some(*i)),
    Some(other) => Err(Error::TypeMismatch {
      column:   column.to_owned(),
      expected: "integer",
      found:    other.kind(),
    }),
  }
}

fn text_field(row: &Row, column: &str) -> Result<Option<String>> {
  match row.get(column) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Text(s)) => Ok(Some(s.clone())),
    Some(other) => Err(Error::TypeMismatch {
      column:   column.to_owned(),
      expected: "text",
      found:    other.kind(),
    }),
  }
}

/// The writable part of a [`Record`]. `None` fields are left out of the
/// payload: NULL on insert, untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
  pub year:     Option<i64>,
  pub month:    Option<i64>,
  pub category: Option<String>,
  pub detail:   Option<String>,
  pub value:    Option<i64>,
  pub memo:     Option<String>,
}

impl From<NewRecord> for Fields {
  fn from(r: NewRecord) -> Self {
    let mut fields = Fields::new();
    let pairs: [(&str, Option<Value>); 6] = [
      ("year", r.year.map(Value::from)),
      ("month", r.month.map(Value::from)),
      ("category", r.category.map(Value::from)),
      ("detail", r.detail.map(Value::from)),
      ("value", r.value.map(Value::from)),
      ("memo", r.memo.map(Value::from)),
    ];
    for (name, value) in pairs {
      if let Some(v) = value {
        fields.set(name, v);
      }
    }
    fields
  }
}
