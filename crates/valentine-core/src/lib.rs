//! Core types and trait definitions for the Valentine activity backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Every other crate depends on it.

pub mod email;
pub mod error;
pub mod selection;
pub mod status;
pub mod store;

pub use email::EmailAddress;
pub use error::{Error, Result};

use chrono::{DateTime, SubsecRound as _, Utc};

/// The current UTC time at the microsecond precision records are stored with.
pub fn now_micros() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }
