//! The `LedgerStore` trait.
//!
//! Implemented by storage backends (e.g. `ledger-store-sqlite`). The trait
//! covers the operations of an *open* store; opening and closing are
//! backend-specific and live on the concrete type.

use std::future::Future;

use crate::{Fields, Filters, Frame, Row};

/// Abstraction over an open ledger table.
///
/// Every mutating call commits on its own; there is no transaction spanning
/// calls. All methods return `Send` futures so the trait can be driven from a
/// multi-threaded runtime.
pub trait LedgerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert the recognised subset of `fields`. A payload with no recognised
  /// keys is a successful no-op. The assigned id is not returned.
  fn insert<'a>(
    &'a self,
    fields: &'a Fields,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Update the recognised subset of `fields` on row `id`.
  ///
  /// Returns the number of rows affected; an unknown id yields `Ok(0)`.
  fn update<'a>(
    &'a self,
    id: i64,
    fields: &'a Fields,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Delete row `id`, returning the number of rows affected.
  fn delete(&self, id: i64) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Return the rows matching `filters` in the store's natural order.
  fn select<'a>(
    &'a self,
    filters: &'a Filters,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + 'a;

  /// Like [`Self::select`], materialised as a [`Frame`] with the store's
  /// result columns.
  fn frame<'a>(
    &'a self,
    filters: &'a Filters,
  ) -> impl Future<Output = Result<Frame, Self::Error>> + Send + 'a;
}
