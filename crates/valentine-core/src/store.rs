//! The `SelectionStore` trait.
//!
//! Implemented by storage backends (e.g. `valentine-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{selection::ActivitySelection, status::StatusCheck};

/// Maximum number of status checks returned by a list.
pub const STATUS_CHECK_LIST_LIMIT: usize = 1000;

/// Maximum number of activity selections returned by a list.
pub const ACTIVITY_LIST_LIMIT: usize = 100;

/// Abstraction over the document store holding both record kinds.
///
/// Both collections are append-only: records are inserted once and never
/// updated or deleted. Each call is an independent, atomic store operation;
/// no multi-record transactions are offered.
pub trait SelectionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Status checks ─────────────────────────────────────────────────────

  /// Persist a fully-built status check.
  fn insert_status_check<'a>(
    &'a self,
    check: &'a StatusCheck,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Return up to `limit` status checks in store insertion order.
  fn list_status_checks(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<StatusCheck>, Self::Error>> + Send + '_;

  // ── Activity selections ───────────────────────────────────────────────

  /// Persist a fully-built activity selection.
  fn insert_activity_selection<'a>(
    &'a self,
    selection: &'a ActivitySelection,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Return up to `limit` activity selections, most recent `timestamp`
  /// first.
  fn list_activity_selections(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ActivitySelection>, Self::Error>> + Send + '_;
}
