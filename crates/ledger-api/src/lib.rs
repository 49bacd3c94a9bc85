//! JSON REST API for the ledger.
//!
//! Exposes an axum [`Router`] over a SQLite ledger. Every request opens the
//! database, performs its operations, and closes it again; only the
//! configuration and the [`DatasetCache`] outlive a request.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", ledger_api::api_router(state))
//! ```

pub mod columns;
pub mod dataset;
pub mod error;
pub mod records;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use ledger_core::Table;
use ledger_csv::Encoding;
use ledger_store_sqlite::{LedgerConfig, ScopedFuture, SqliteLedger};

pub use dataset::{Dataset, DatasetCache};
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub config:   Arc<LedgerConfig>,
  pub table:    Arc<Table>,
  pub encoding: &'static Encoding,
  pub cache:    Arc<DatasetCache>,
}

impl AppState {
  /// Validate `config` once; handlers rely on it being well-formed.
  pub fn new(config: LedgerConfig) -> Result<Self, ledger_store_sqlite::Error> {
    let table    = config.table()?;
    let encoding = config.encoding()?;
    Ok(Self {
      config: Arc::new(config),
      table: Arc::new(table),
      encoding,
      cache: Arc::new(DatasetCache::new()),
    })
  }

  /// Run `f` against a freshly opened ledger, closing it afterwards.
  pub async fn session<T, F>(&self, f: F) -> Result<T, ApiError>
  where
    F: for<'s> FnOnce(&'s SqliteLedger) -> ScopedFuture<'s, T>,
  {
    Ok(SqliteLedger::session(&self.config, f).await?)
  }

  /// Like [`Self::session`], then invalidate the dataset cache whether or
  /// not `f` succeeded.
  pub async fn mutate<T, F>(&self, f: F) -> Result<T, ApiError>
  where
    F: for<'s> FnOnce(&'s SqliteLedger) -> ScopedFuture<'s, T>,
  {
    let outcome = SqliteLedger::session(&self.config, f).await;
    self.cache.invalidate().await;
    Ok(outcome?)
  }

  /// The cached dataset, loading it on first use after an invalidation.
  pub async fn dataset(&self) -> Result<Arc<Dataset>, ApiError> {
    self
      .cache
      .get_or_load(|| self.session(|l| Box::pin(async move { Dataset::load(l).await })))
      .await
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router(state: AppState) -> Router<()> {
  Router::new()
    // Records
    .route("/records", get(records::list).post(records::create))
    .route("/records/import", post(records::import))
    .route("/records/export", get(records::export))
    .route(
      "/records/{id}",
      get(records::get_one)
        .patch(records::update_one)
        .delete(records::delete_one),
    )
    // Filter population
    .route("/columns", get(columns::list))
    .route("/columns/{name}/values", get(columns::values))
    .with_state(state)
}
