//! SQLite-backed document store for the Valentine activity backend.
//!
//! Each collection is a table of JSON documents keyed by an internal row id.
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod collection;
mod encode;
mod schema;
mod store;

pub mod error;

pub use collection::{Collection, SortOrder};
pub use error::{Error, Result};
pub use store::SqliteStore;
