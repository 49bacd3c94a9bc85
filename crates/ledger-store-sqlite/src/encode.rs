//! Conversion between [`ledger_core::Value`] and rusqlite's owned value type.

use ledger_core::Value;
use rusqlite::types::Value as SqlValue;

pub fn encode_value(v: &Value) -> SqlValue {
  match v {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(r) => SqlValue::Real(*r),
    Value::Text(s) => SqlValue::Text(s.clone()),
  }
}

/// BLOBs are never written by the ledger; one found in a foreign table is
/// surfaced as lossy UTF-8 text.
pub fn decode_value(v: SqlValue) -> Value {
  match v {
    SqlValue::Null => Value::Null,
    SqlValue::Integer(i) => Value::Integer(i),
    SqlValue::Real(r) => Value::Real(r),
    SqlValue::Text(s) => Value::Text(s),
    SqlValue::Blob(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
  }
}

pub fn encode_params(params: &[Value]) -> Vec<SqlValue> {
  params.iter().map(encode_value).collect()
}
