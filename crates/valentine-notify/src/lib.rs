//! Best-effort email notifications for recorded activity selections.
//!
//! Handlers hand a selection to a [`Notifier`], which pushes it onto a bounded
//! queue and returns immediately. A dedicated worker drains the queue, composes
//! the email, and performs the SMTP exchange on the blocking thread pool.
//! Failures are logged and counted, never returned to the caller.
//!
//! # Quick start
//!
//! ```no_run
//! # async fn demo(selection: valentine_core::selection::ActivitySelection) {
//! use valentine_notify::{Notifier, SmtpConfig, SmtpMailer};
//!
//! let config = SmtpConfig::new("smtp.example.com", "valentine@example.com");
//! let (notifier, _worker) = Notifier::spawn(SmtpMailer::new(config), 64);
//! notifier.notify(&selection);
//! # }
//! ```

pub mod error;
mod mailer;
mod message;
mod worker;

pub use error::MailError;
pub use mailer::{Mailer, SmtpConfig, SmtpMailer, SmtpSettings};
pub use message::{OutgoingEmail, compose};
pub use worker::{DeliveryStats, Dispatch, Notifier};
