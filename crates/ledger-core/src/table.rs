//! [`Table`]: a validated table name plus its schema, and the parameterized
//! SQL it generates.
//!
//! Identifiers are interpolated into the SQL text; they come only from the
//! validated [`Schema`] and table name. Every value is emitted as a `?`
//! placeholder and carried separately in [`Statement::params`].

use crate::{
  Fields, Filters, Result, Schema, Value,
  schema::{ID_COLUMN, validate_identifier},
};

/// A SQL string and the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  pub sql:    String,
  pub params: Vec<Value>,
}

/// A table the ledger reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
  name:   String,
  schema: Schema,
}

impl Table {
  pub fn new(name: impl Into<String>, schema: Schema) -> Result<Self> {
    let name = name.into();
    validate_identifier(&name)?;
    Ok(Self { name, schema })
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn schema(&self) -> &Schema { &self.schema }

  /// Column names in result order: identity first, then the schema.
  pub fn column_names(&self) -> Vec<String> {
    std::iter::once(ID_COLUMN.to_owned())
      .chain(self.schema.columns().iter().map(|c| c.name.clone()))
      .collect()
  }

  /// Lookup used by `open` to decide whether to run [`Self::create_sql`].
  /// Binds the table name as `?1`.
  pub fn exists_sql() -> &'static str {
    "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1"
  }

  pub fn create_sql(&self) -> String {
    let mut columns = vec![format!("{ID_COLUMN} INTEGER PRIMARY KEY AUTOINCREMENT")];
    columns.extend(
      self
        .schema
        .columns()
        .iter()
        .map(|c| format!("{} {}", c.name, c.decl_type).trim_end().to_owned()),
    );
    format!("CREATE TABLE {} ({})", self.name, columns.join(", "))
  }

  /// `INSERT` over the recognised keys of `fields`; `None` if there are none.
  pub fn insert(&self, fields: &Fields) -> Option<Statement> {
    let known = self.schema.recognize(fields);
    if known.is_empty() {
      return None;
    }

    let names: Vec<&str> = known.iter().map(|(name, _)| *name).collect();
    let marks = vec!["?"; known.len()].join(", ");
    Some(Statement {
      sql:    format!(
        "INSERT INTO {} ({}) VALUES ({marks})",
        self.name,
        names.join(", ")
      ),
      params: known.into_iter().map(|(_, v)| v.clone()).collect(),
    })
  }

  /// `UPDATE … WHERE id = ?` over the recognised keys of `fields`; `None` if
  /// there are none. The id is bound last.
  pub fn update(&self, id: i64, fields: &Fields) -> Option<Statement> {
    let known = self.schema.recognize(fields);
    if known.is_empty() {
      return None;
    }

    let assignments: Vec<String> =
      known.iter().map(|(name, _)| format!("{name} = ?")).collect();
    let mut params: Vec<Value> = known.into_iter().map(|(_, v)| v.clone()).collect();
    params.push(Value::Integer(id));

    Some(Statement {
      sql: format!(
        "UPDATE {} SET {} WHERE {ID_COLUMN} = ?",
        self.name,
        assignments.join(", ")
      ),
      params,
    })
  }

  pub fn delete(&self, id: i64) -> Statement {
    Statement {
      sql:    format!("DELETE FROM {} WHERE {ID_COLUMN} = ?", self.name),
      params: vec![Value::Integer(id)],
    }
  }

  /// `SELECT *` constrained by `filters`.
  ///
  /// Each recognised key contributes one predicate and predicates are AND-ed.
  /// A scalar or single-element list is `col = ?`; a longer list is the
  /// parenthesised OR of equalities, bound in list order. Unknown keys and
  /// empty lists contribute nothing; with no predicates the `WHERE` is
  /// omitted.
  pub fn select(&self, filters: &Filters) -> Statement {
    let mut predicates: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    for (column, filter) in filters.iter() {
      if !self.schema.is_filterable(column) {
        tracing::debug!(column = %column, "ignoring filter on unrecognised column");
        continue;
      }

      let values = filter.values();
      match values.len() {
        0 => continue,
        1 => predicates.push(format!("{column} = ?")),
        n => {
          let terms = vec![format!("{column} = ?"); n];
          predicates.push(format!("({})", terms.join(" OR ")));
        }
      }
      params.extend(values.iter().cloned());
    }

    let mut sql = format!("SELECT * FROM {}", self.name);
    if !predicates.is_empty() {
      sql.push_str(" WHERE ");
      sql.push_str(&predicates.join(" AND "));
    }
    Statement { sql, params }
  }
}
