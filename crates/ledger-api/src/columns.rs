//! Handlers for `/columns` endpoints, used to populate filter controls.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/columns` | Display columns, including the derived `period` |
//! | `GET`  | `/columns/:name/values` | Sorted distinct values; same filters as `GET /records`; 404 for an unknown column |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use ledger_core::Value;

use crate::{AppState, error::ApiError, records::filters_from_query};

/// `GET /columns`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
  let dataset = state.dataset().await?;
  Ok(Json(dataset.columns().to_vec()))
}

/// `GET /columns/:name/values[?column=value…]`
///
/// Filters narrow the rows the values are drawn from, e.g. the details
/// recorded under one category.
pub async fn values(
  State(state): State<AppState>,
  Path(name): Path<String>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Value>>, ApiError> {
  let filters = filters_from_query(state.table.schema(), pairs);
  let dataset = state.dataset().await?;
  let values = dataset
    .values_matching(&name, &filters)
    .ok_or_else(|| ApiError::NotFound(format!("column {name} not found")))?;
  Ok(Json(values))
}
