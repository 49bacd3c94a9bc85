//! Scalar values and the column-keyed mappings built from them.
//!
//! [`Fields`] carries the payload of an insert or update; [`Filters`] carries
//! the constraints of a select. Both are plain ordered maps keyed by column
//! name. Keys are only trusted after [`Schema`](crate::Schema) has recognised
//! them.

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

// ─── Value ───────────────────────────────────────────────────────────────────

/// A single cell value, mirroring SQLite's storage classes (minus BLOB).
///
/// Serialises as a bare JSON scalar: `null`, a number, or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
  #[default]
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  /// Name of the storage class, for error messages.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Null => "null",
      Self::Integer(_) => "integer",
      Self::Real(_) => "real",
      Self::Text(_) => "text",
    }
  }

  /// Integer view of the value. Reals are truncated and numeric text is
  /// parsed, the way SQLite's integer affinity would coerce them.
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      Self::Real(r) if r.is_finite() => Some(r.trunc() as i64),
      Self::Text(s) => s.trim().parse().ok(),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  /// A total order across storage classes: NULL < numbers < text, numbers
  /// compared by magnitude regardless of class.
  pub fn total_cmp(&self, other: &Self) -> Ordering {
    use Value::*;
    match (self, other) {
      (Null, Null) => Ordering::Equal,
      (Null, _) => Ordering::Less,
      (_, Null) => Ordering::Greater,
      (Integer(a), Integer(b)) => a.cmp(b),
      (Integer(a), Real(b)) => (*a as f64).total_cmp(b),
      (Real(a), Integer(b)) => a.total_cmp(&(*b as f64)),
      (Real(a), Real(b)) => a.total_cmp(b),
      (Text(a), Text(b)) => a.cmp(b),
      (Text(_), _) => Ordering::Greater,
      (_, Text(_)) => Ordering::Less,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Null => Ok(()),
      Self::Integer(i) => write!(f, "{i}"),
      Self::Real(r) => write!(f, "{r}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<i32> for Value {
  fn from(v: i32) -> Self { Self::Integer(v.into()) }
}

impl From<u32> for Value {
  fn from(v: u32) -> Self { Self::Integer(v.into()) }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self { Self::Real(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// Column name → value payload for inserts and updates.
///
/// Iteration order is the key order, so the generated column list is
/// deterministic for a given payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
  pub fn new() -> Self { Self::default() }

  /// Builder-style insert.
  pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
    self.set(column, value);
    self
  }

  pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
    self.0.insert(column.into(), value.into());
  }

  pub fn get(&self, column: &str) -> Option<&Value> { self.0.get(column) }

  pub fn remove(&mut self, column: &str) -> Option<Value> { self.0.remove(column) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// The constraint a select places on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
  /// `column = ?`
  One(Value),
  /// `(column = ? OR column = ? …)`; a single element degrades to `One`.
  Any(Vec<Value>),
}

impl FilterValue {
  /// The values to bind, in placeholder order.
  pub fn values(&self) -> &[Value] {
    match self {
      Self::One(v) => std::slice::from_ref(v),
      Self::Any(vs) => vs,
    }
  }
}

/// Column name → constraint; distinct keys are AND-ed together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, FilterValue>);

impl Filters {
  pub fn new() -> Self { Self::default() }

  /// Builder-style equality constraint.
  pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
    self.0.insert(column.into(), FilterValue::One(value.into()));
    self
  }

  /// Builder-style membership constraint.
  pub fn any<I, V>(mut self, column: impl Into<String>, values: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
  {
    let values = values.into_iter().map(Into::into).collect();
    self.0.insert(column.into(), FilterValue::Any(values));
    self
  }

  pub fn set(&mut self, column: impl Into<String>, filter: FilterValue) {
    self.0.insert(column.into(), filter);
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }
}
