//! Error type for mail delivery.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
  #[error("invalid address: {0}")]
  Address(#[from] lettre::address::AddressError),

  #[error("failed to build message: {0}")]
  Build(#[from] lettre::error::Error),

  #[error("SMTP error: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),

  /// Delivery failure reported by a [`Mailer`](crate::Mailer) that does not
  /// go through lettre's SMTP transport.
  #[error("transport error: {0}")]
  Transport(String),

  /// The blocking send task panicked or was cancelled.
  #[error("mail task failed: {0}")]
  Worker(String),
}
