//! [`SqliteLedger`], the SQLite implementation of [`LedgerStore`].

use std::{
  future::Future,
  path::{Path, PathBuf},
  pin::Pin,
  sync::Arc,
};

use ledger_core::{Fields, Filters, Frame, LedgerStore, Row, Statement, Table};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, LedgerConfig, Result,
  config::MEMORY_PATH,
  encode::{decode_value, encode_params},
};

/// The future a [`SqliteLedger::scoped`] body returns; it may borrow the
/// open ledger for `'a`.
pub type ScopedFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A ledger table in a single SQLite file.
///
/// Construction only validates configuration; nothing touches the database
/// until [`open`](Self::open). Every mutating call runs in SQLite's autocommit
/// mode, so it is durable when it returns and independent of every other
/// call.
pub struct SqliteLedger {
  db_path:  PathBuf,
  table:    Arc<Table>,
  encoding: &'static ledger_csv::Encoding,
  conn:     Option<tokio_rusqlite::Connection>,
}

impl SqliteLedger {
  pub fn new(config: &LedgerConfig) -> Result<Self> {
    Ok(Self {
      db_path:  config.db_path.clone(),
      table:    Arc::new(config.table()?),
      encoding: config.encoding()?,
      conn:     None,
    })
  }

  /// Build a ledger for `config`, then [`scoped`](Self::scoped) it.
  pub async fn session<T, F>(config: &LedgerConfig, f: F) -> Result<T>
  where
    F: for<'s> FnOnce(&'s SqliteLedger) -> ScopedFuture<'s, T>,
  {
    let mut ledger = Self::new(config)?;
    ledger.scoped(f).await
  }

  pub fn table(&self) -> &Table { &self.table }

  pub fn encoding(&self) -> &'static ledger_csv::Encoding { self.encoding }

  pub fn is_open(&self) -> bool { self.conn.is_some() }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  /// Connect and create the table if it does not exist yet. No-op when
  /// already open.
  pub async fn open(&mut self) -> Result<()> {
    if self.conn.is_some() {
      return Ok(());
    }

    let conn = if self.db_path.as_os_str() == MEMORY_PATH {
      tokio_rusqlite::Connection::open_in_memory().await?
    } else {
      tokio_rusqlite::Connection::open(&self.db_path).await?
    };

    let name   = self.table.name().to_owned();
    let create = self.table.create_sql();
    let created = conn
      .call(move |conn| {
        let exists = conn
          .query_row(Table::exists_sql(), rusqlite::params![name], |_| Ok(()))
          .optional()?
          .is_some();
        if !exists {
          conn.execute(&create, [])?;
        }
        Ok(!exists)
      })
      .await;

    // Release the fresh connection if table setup failed.
    let created = match created {
      Ok(created) => created,
      Err(e) => {
        let _ = conn.close().await;
        return Err(e.into());
      }
    };

    if created {
      tracing::info!(table = self.table.name(), path = ?self.db_path, "created ledger table");
    }
    tracing::debug!(table = self.table.name(), "ledger opened");
    self.conn = Some(conn);
    Ok(())
  }

  /// Release the connection. No-op when already closed.
  pub async fn close(&mut self) -> Result<()> {
    let Some(conn) = self.conn.take() else {
      return Ok(());
    };
    conn.close().await?;
    tracing::debug!(table = self.table.name(), "ledger closed");
    Ok(())
  }

  /// Open, run `f` against the open ledger, and close on every exit path.
  ///
  /// The body's error wins over a close error.
  ///
  /// ```rust,ignore
  /// let rows = ledger
  ///   .scoped(|l| Box::pin(async move { l.select(&filters).await }))
  ///   .await?;
  /// ```
  pub async fn scoped<T, F>(&mut self, f: F) -> Result<T>
  where
    F: for<'s> FnOnce(&'s SqliteLedger) -> ScopedFuture<'s, T>,
  {
    self.open().await?;
    let outcome = f(&*self).await;
    let closed  = self.close().await;
    let value   = outcome?;
    closed?;
    Ok(value)
  }

  // ── Export ────────────────────────────────────────────────────────────────

  /// Write the rows matching `filters` to `path` as CSV in the configured
  /// export encoding, and return them.
  pub async fn export_csv(&self, filters: &Filters, path: impl AsRef<Path>) -> Result<Frame> {
    let path  = path.as_ref();
    let frame = self.frame(filters).await?;
    let bytes = ledger_csv::write_frame(&frame, self.encoding)?;
    tokio::fs::write(path, bytes).await?;
    tracing::info!(rows = frame.len(), ?path, "exported ledger");
    Ok(frame)
  }

  // ── Statement execution ───────────────────────────────────────────────────

  fn conn(&self) -> Result<&tokio_rusqlite::Connection> {
    self.conn.as_ref().ok_or(Error::NotOpen)
  }

  /// Run a mutating statement; returns the number of rows changed.
  async fn execute(&self, stmt: Statement) -> Result<usize> {
    let conn   = self.conn()?;
    let sql    = stmt.sql;
    let params = encode_params(&stmt.params);

    let changed = conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(params.iter()))?))
      .await?;
    Ok(changed)
  }

  /// Run a query and collect every row with the result column names.
  async fn query(&self, stmt: Statement) -> Result<Frame> {
    let conn   = self.conn()?;
    let sql    = stmt.sql;
    let params = encode_params(&stmt.params);

    let (columns, raw_rows) = conn
      .call(move |conn| {
        let mut prepared = conn.prepare(&sql)?;
        let columns: Vec<String> = prepared
          .column_names()
          .into_iter()
          .map(str::to_owned)
          .collect();
        let width = columns.len();

        let rows = prepared
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            (0..width)
              .map(|i| row.get::<_, rusqlite::types::Value>(i))
              .collect::<rusqlite::Result<Vec<_>>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((columns, rows))
      })
      .await?;

    Ok(Frame {
      columns,
      rows: raw_rows
        .into_iter()
        .map(|cells| cells.into_iter().map(decode_value).collect())
        .collect(),
    })
  }
}

impl Drop for SqliteLedger {
  fn drop(&mut self) {
    // Dropping the handle ends the connection thread, which closes SQLite.
    if self.conn.take().is_some() {
      tracing::debug!(table = self.table.name(), "ledger dropped while open");
    }
  }
}

// ─── LedgerStore impl ────────────────────────────────────────────────────────

impl LedgerStore for SqliteLedger {
  type Error = Error;

  async fn insert(&self, fields: &Fields) -> Result<()> {
    let Some(stmt) = self.table.insert(fields) else {
      tracing::debug!("insert with no recognised fields; nothing to do");
      return Ok(());
    };
    self.execute(stmt).await?;
    Ok(())
  }

  async fn update(&self, id: i64, fields: &Fields) -> Result<usize> {
    let Some(stmt) = self.table.update(id, fields) else {
      tracing::debug!(id, "update with no recognised fields; nothing to do");
      return Ok(0);
    };
    let changed = self.execute(stmt).await?;
    if changed == 0 {
      tracing::debug!(id, "update matched no row");
    }
    Ok(changed)
  }

  async fn delete(&self, id: i64) -> Result<usize> {
    let changed = self.execute(self.table.delete(id)).await?;
    if changed == 0 {
      tracing::debug!(id, "delete matched no row");
    }
    Ok(changed)
  }

  async fn select(&self, filters: &Filters) -> Result<Vec<Row>> {
    Ok(self.frame(filters).await?.to_rows()?)
  }

  async fn frame(&self, filters: &Filters) -> Result<Frame> {
    self.query(self.table.select(filters)).await
  }
}
