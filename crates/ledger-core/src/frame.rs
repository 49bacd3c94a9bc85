//! [`Frame`]: selected rows materialised as a rows × named-columns table.

use serde::{Deserialize, Serialize};

use crate::{Error, Fields, Filters, Result, Row, Value, schema::ID_COLUMN};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
  pub columns: Vec<String>,
  /// Each row has exactly `columns.len()` cells.
  pub rows:    Vec<Vec<Value>>,
}

impl Frame {
  pub fn new(columns: Vec<String>) -> Self { Self { columns, rows: Vec::new() } }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.columns.iter().position(|c| c == name)
  }

  /// Every cell of one column, top to bottom.
  pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + use<'a>> {
    let idx = self.column_index(name)?;
    Some(self.rows.iter().map(move |r| &r[idx]))
  }

  /// Sorted distinct non-null values of one column.
  pub fn distinct(&self, name: &str) -> Option<Vec<Value>> {
    let mut values: Vec<Value> = self
      .column(name)?
      .filter(|v| !v.is_null())
      .cloned()
      .collect();
    values.sort_by(Value::total_cmp);
    values.dedup();
    Some(values)
  }

  /// The rows matching `filters`, with the same columns.
  ///
  /// Matches the way a select does: keys are AND-ed, list values OR-ed, and
  /// NULL never equals anything. Keys naming no column and empty lists are
  /// ignored.
  pub fn filtered(&self, filters: &Filters) -> Frame {
    let predicates: Vec<(usize, &[Value])> = filters
      .iter()
      .filter_map(|(name, f)| self.column_index(name).map(|idx| (idx, f.values())))
      .filter(|(_, values)| !values.is_empty())
      .collect();

    let rows = self
      .rows
      .iter()
      .filter(|row| {
        predicates.iter().all(|(idx, values)| {
          let cell = &row[*idx];
          !cell.is_null() && values.iter().any(|v| cell.total_cmp(v).is_eq())
        })
      })
      .cloned()
      .collect();

    Frame { columns: self.columns.clone(), rows }
  }

  /// Append a derived column computed from each row.
  pub fn push_column(
    &mut self,
    name: impl Into<String>,
    mut f: impl FnMut(&Self, &[Value]) -> Value,
  ) {
    let derived: Vec<Value> = self.rows.iter().map(|r| f(self, r)).collect();
    self.columns.push(name.into());
    for (row, v) in self.rows.iter_mut().zip(derived) {
      row.push(v);
    }
  }

  /// Split every row back into identity and fields.
  pub fn to_rows(&self) -> Result<Vec<Row>> {
    let id_idx = self
      .column_index(ID_COLUMN)
      .ok_or_else(|| Error::MissingColumn(ID_COLUMN.to_owned()))?;

    self
      .rows
      .iter()
      .map(|cells| {
        let id = match &cells[id_idx] {
          Value::Integer(i) => *i,
          Value::Null => return Err(Error::UnexpectedNull(ID_COLUMN.to_owned())),
          other => {
            return Err(Error::TypeMismatch {
              column:   ID_COLUMN.to_owned(),
              expected: "integer",
              found:    other.kind(),
            });
          }
        };
        let fields: Fields = self
          .columns
          .iter()
          .zip(cells)
          .enumerate()
          .filter(|(i, _)| *i != id_idx)
          .map(|(_, (name, v))| (name.clone(), v.clone()))
          .collect();
        Ok(Row { id, fields })
      })
      .collect()
  }
}
