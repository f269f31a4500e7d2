//! Named collections of the document store.

use std::fmt;

/// A named collection. Table names come only from this closed set, so they
/// are safe to splice into SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
  StatusChecks,
  ActivitySelections,
}

impl Collection {
  pub fn name(self) -> &'static str {
    match self {
      Collection::StatusChecks => "status_checks",
      Collection::ActivitySelections => "activity_selections",
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Ordering applied by [`SqliteStore::find`](crate::SqliteStore::find).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  /// Store-native insertion order.
  #[default]
  Natural,
  /// Most recent `timestamp` first; ties go to the later insert.
  TimestampDesc,
}
