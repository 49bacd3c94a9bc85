//! The loaded dataset and its explicit cache.
//!
//! Listing distinct values for filter controls needs the whole table. The
//! table is loaded once into a [`Dataset`] and kept in a [`DatasetCache`]
//! until a mutation calls [`DatasetCache::invalidate`].

use std::{collections::BTreeMap, future::Future, sync::Arc};

use ledger_core::{Filters, Frame, LedgerStore, Value};
use tokio::sync::RwLock;

/// Display-only column derived from `year` and `month`.
pub const PERIOD_COLUMN: &str = "period";

/// `"{year}-{month:02}"`, or NULL when either part is missing.
pub fn period(year: &Value, month: &Value) -> Value {
  match (year.as_i64(), month.as_i64()) {
    (Some(y), Some(m)) => Value::Text(format!("{y}-{m:02}")),
    _ => Value::Null,
  }
}

// ─── Dataset ─────────────────────────────────────────────────────────────────

/// The full table plus the values derived from it for display.
#[derive(Debug, Clone)]
pub struct Dataset {
  frame:  Frame,
  /// Sorted distinct non-null values per column.
  values: BTreeMap<String, Vec<Value>>,
}

impl Dataset {
  /// Read the whole table from an open store.
  pub async fn load<S: LedgerStore>(store: &S) -> Result<Self, S::Error> {
    let frame = store.frame(&Filters::new()).await?;
    Ok(Self::from_frame(frame))
  }

  pub fn from_frame(mut frame: Frame) -> Self {
    if let (Some(y), Some(m)) = (frame.column_index("year"), frame.column_index("month")) {
      frame.push_column(PERIOD_COLUMN, |_, row| period(&row[y], &row[m]));
    }

    let values = frame
      .columns
      .iter()
      .filter_map(|c| frame.distinct(c).map(|vs| (c.clone(), vs)))
      .collect();

    Self { frame, values }
  }

  pub fn frame(&self) -> &Frame { &self.frame }

  pub fn columns(&self) -> &[String] { &self.frame.columns }

  pub fn values(&self, column: &str) -> Option<&[Value]> {
    self.values.get(column).map(Vec::as_slice)
  }

  /// Sorted distinct non-null values of `column` over the rows matching
  /// `filters`; `None` for an unknown column.
  pub fn values_matching(&self, column: &str, filters: &Filters) -> Option<Vec<Value>> {
    if filters.is_empty() {
      return self.values(column).map(<[Value]>::to_vec);
    }
    self.frame.filtered(filters).distinct(column)
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// Holds at most one loaded [`Dataset`], shared across requests.
#[derive(Debug, Default)]
pub struct DatasetCache {
  slot: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetCache {
  pub fn new() -> Self { Self::default() }

  /// Return the cached dataset, running `load` first if there is none.
  /// Concurrent callers on an empty cache wait for a single load.
  pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<Arc<Dataset>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Dataset, E>>,
  {
    if let Some(ds) = self.slot.read().await.as_ref() {
      return Ok(Arc::clone(ds));
    }

    let mut slot = self.slot.write().await;
    if let Some(ds) = slot.as_ref() {
      return Ok(Arc::clone(ds));
    }
    let ds = Arc::new(load().await?);
    tracing::debug!(rows = ds.frame.len(), "dataset loaded");
    *slot = Some(Arc::clone(&ds));
    Ok(ds)
  }

  /// Drop the cached dataset; the next read reloads it.
  pub async fn invalidate(&self) {
    if self.slot.write().await.take().is_some() {
      tracing::debug!("dataset invalidated");
    }
  }

  pub async fn is_loaded(&self) -> bool { self.slot.read().await.is_some() }
}
