//! Error types for `valentine-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid email address {input:?}: {reason}")]
  InvalidEmail { input: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
