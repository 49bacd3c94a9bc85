//! Handlers for `/records` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/records` | Query-string filters; repeat a key to match any of its values |
//! | `GET`    | `/records/:id` | 404 if not found |
//! | `POST`   | `/records` | Body: JSON object of column → value; 201 |
//! | `PATCH`  | `/records/:id` | Body as for `POST`; 204, or 404 if no row changed |
//! | `DELETE` | `/records/:id` | 204, or 404 if no row was deleted |
//! | `POST`   | `/records/import` | Body: CSV in the export encoding |
//! | `GET`    | `/records/export` | Same filters as `GET /records`; returns CSV |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use bytes::Bytes;
use ledger_core::{FilterValue, Fields, Filters, LedgerStore, Row, Schema, Value};
use serde_json::json;

use crate::{AppState, error::ApiError};

/// Group `key=value` pairs by key. A key seen once is an equality, a repeated
/// key a membership test. Values are coerced by the column's affinity.
///
/// A blank value for a numeric column (`?year=`) coerces to NULL, which no
/// row equals, so it is dropped instead. Blank text values are kept.
pub fn filters_from_query(schema: &Schema, pairs: Vec<(String, String)>) -> Filters {
  let mut grouped: BTreeMap<String, Vec<Value>> = BTreeMap::new();
  for (column, raw) in pairs {
    let value = schema.coerce(&column, &raw);
    if value.is_null() {
      tracing::debug!(column = %column, "ignoring blank filter value");
      continue;
    }
    grouped.entry(column).or_default().push(value);
  }

  let mut filters = Filters::new();
  for (column, mut values) in grouped {
    let filter = if values.len() == 1 {
      FilterValue::One(values.remove(0))
    } else {
      FilterValue::Any(values)
    };
    filters.set(column, filter);
  }
  filters
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /records[?column=value…]`
pub async fn list(
  State(state): State<AppState>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Row>>, ApiError> {
  let filters = filters_from_query(state.table.schema(), pairs);
  let rows = state
    .session(move |l| Box::pin(async move { l.select(&filters).await }))
    .await?;
  Ok(Json(rows))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/:id`
pub async fn get_one(
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<Row>, ApiError> {
  let filters = Filters::new().eq(ledger_core::ID_COLUMN, id);
  let row = state
    .session(move |l| Box::pin(async move { l.select(&filters).await }))
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  Ok(Json(row))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /records`. Unknown keys are ignored; an empty payload is a no-op.
pub async fn create(
  State(state): State<AppState>,
  Json(fields): Json<Fields>,
) -> Result<StatusCode, ApiError> {
  state
    .mutate(move |l| Box::pin(async move { l.insert(&fields).await }))
    .await?;
  Ok(StatusCode::CREATED)
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /records/:id`
pub async fn update_one(
  State(state): State<AppState>,
  Path(id): Path<i64>,
  Json(fields): Json<Fields>,
) -> Result<StatusCode, ApiError> {
  if state.table.schema().recognize(&fields).is_empty() {
    return Ok(StatusCode::NO_CONTENT);
  }

  let changed = state
    .mutate(move |l| Box::pin(async move { l.update(id, &fields).await }))
    .await?;
  if changed == 0 {
    return Err(ApiError::NotFound(format!("record {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /records/:id`
pub async fn delete_one(
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  let changed = state
    .mutate(move |l| Box::pin(async move { l.delete(id).await }))
    .await?;
  if changed == 0 {
    return Err(ApiError::NotFound(format!("record {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Import ───────────────────────────────────────────────────────────────────

/// `POST /records/import`. One insert per CSV line. Each insert commits on
/// its own, so a failure part-way keeps the lines before it.
pub async fn import(
  State(state): State<AppState>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
  let payloads = ledger_csv::read_fields(&body, state.encoding, state.table.schema(), None)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  let imported = payloads.len();

  state
    .mutate(move |l| {
      Box::pin(async move {
        for fields in &payloads {
          l.insert(fields).await?;
        }
        Ok(())
      })
    })
    .await?;

  tracing::info!(imported, "imported records");
  Ok(Json(json!({ "imported": imported })))
}

// ─── Export ───────────────────────────────────────────────────────────────────

/// `GET /records/export[?column=value…]`
pub async fn export(
  State(state): State<AppState>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ApiError> {
  let filters = filters_from_query(state.table.schema(), pairs);
  let frame = state
    .session(move |l| Box::pin(async move { l.frame(&filters).await }))
    .await?;
  let bytes = ledger_csv::write_frame(&frame, state.encoding)
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let content_type = format!("text/csv; charset={}", state.encoding.name());
  let disposition  = format!("attachment; filename=\"{}.csv\"", state.table.name());
  Ok((
    [
      (header::CONTENT_TYPE, content_type),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    bytes,
  ))
}
