//! The SQLite implementation of [`SelectionStore`].

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use valentine_core::{
  selection::ActivitySelection,
  status::StatusCheck,
  store::SelectionStore,
};

use crate::{
  Collection, Result, SortOrder,
  encode::{decode_document, encode_document},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap. The inner connection is reference-counted, and every
/// clone shares the same long-lived connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Close the underlying connection. Other clones fail afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    tracing::info!("document store closed");
    Ok(())
  }

  // ── Generic document operations ───────────────────────────────────────────

  /// Insert one document into `collection`.
  pub async fn insert<T: Serialize>(
    &self,
    collection: Collection,
    record: &T,
  ) -> Result<()> {
    let document = encode_document(collection, record)?;
    let sql = format!("INSERT INTO {collection} (document) VALUES (?1)");

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![document])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch up to `limit` documents from `collection` in the given order.
  ///
  /// Only the document body is read; the internal `_id` never leaves the
  /// store.
  pub async fn find<T: DeserializeOwned>(
    &self,
    collection: Collection,
    order: SortOrder,
    limit: usize,
  ) -> Result<Vec<T>> {
    let order_by = match order {
      SortOrder::Natural => "_id ASC",
      SortOrder::TimestampDesc => "json_extract(document, '$.timestamp') DESC, _id DESC",
    };
    let sql = format!("SELECT document FROM {collection} ORDER BY {order_by} LIMIT ?1");
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let texts: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    texts
      .iter()
      .map(|text| decode_document(collection, text))
      .collect()
  }

  /// Number of documents in `collection`.
  pub async fn count(&self, collection: Collection) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {collection}");
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }
}

// ─── SelectionStore impl ─────────────────────────────────────────────────────

impl SelectionStore for SqliteStore {
  type Error = crate::Error;

  async fn insert_status_check(&self, check: &StatusCheck) -> Result<()> {
    self.insert(Collection::StatusChecks, check).await
  }

  async fn list_status_checks(&self, limit: usize) -> Result<Vec<StatusCheck>> {
    self.find(Collection::StatusChecks, SortOrder::Natural, limit).await
  }

  async fn insert_activity_selection(&self, selection: &ActivitySelection) -> Result<()> {
    self.insert(Collection::ActivitySelections, selection).await
  }

  async fn list_activity_selections(
    &self,
    limit: usize,
  ) -> Result<Vec<ActivitySelection>> {
    self
      .find(Collection::ActivitySelections, SortOrder::TimestampDesc, limit)
      .await
  }
}

#[cfg(test)]
impl SqliteStore {
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }
}
