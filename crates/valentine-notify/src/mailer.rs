//! The [`Mailer`] seam and its SMTP implementation over [lettre].

use std::time::Duration;

use lettre::{
  Message, SmtpTransport, Transport as _,
  message::{Mailbox, header::ContentType},
  transport::smtp::authentication::Credentials,
};

use crate::{MailError, OutgoingEmail};

/// Submission port used when none is configured.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Connect and IO timeout for one SMTP exchange.
pub const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends a composed email.
///
/// Implementations may block; the worker always calls them on the blocking
/// thread pool.
pub trait Mailer: Send + Sync + 'static {
  fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Raw mail settings as read from configuration. Any field may be missing.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
  pub host:       Option<String>,
  pub port:       u16,
  pub username:   Option<String>,
  pub password:   Option<String>,
  pub from_email: Option<String>,
  pub from_name:  Option<String>,
  pub use_tls:    bool,
}

impl Default for SmtpSettings {
  fn default() -> Self {
    Self {
      host:       None,
      port:       DEFAULT_SMTP_PORT,
      username:   None,
      password:   None,
      from_email: None,
      from_name:  None,
      use_tls:    true,
    }
  }
}

impl SmtpSettings {
  /// Resolve into a usable [`SmtpConfig`].
  ///
  /// Returns `None`, meaning notifications are disabled, unless both a host
  /// and a from-address are present. Empty strings count as absent.
  pub fn resolve(self) -> Option<SmtpConfig> {
    let host = non_empty(self.host)?;
    let from_email = non_empty(self.from_email)?;
    Some(SmtpConfig {
      host,
      port: self.port,
      username: non_empty(self.username),
      password: non_empty(self.password),
      from_email,
      from_name: non_empty(self.from_name),
      use_tls: self.use_tls,
      timeout: DEFAULT_SMTP_TIMEOUT,
    })
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

/// Fully resolved SMTP configuration; notifications are enabled.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
  pub host:       String,
  pub port:       u16,
  pub username:   Option<String>,
  pub password:   Option<String>,
  pub from_email: String,
  pub from_name:  Option<String>,
  pub use_tls:    bool,
  pub timeout:    Duration,
}

impl SmtpConfig {
  /// Minimal config: STARTTLS on the submission port, no login.
  pub fn new(host: impl Into<String>, from_email: impl Into<String>) -> Self {
    Self {
      host:       host.into(),
      port:       DEFAULT_SMTP_PORT,
      username:   None,
      password:   None,
      from_email: from_email.into(),
      from_name:  None,
      use_tls:    true,
      timeout:    DEFAULT_SMTP_TIMEOUT,
    }
  }
}

// ─── SMTP mailer ─────────────────────────────────────────────────────────────

/// Sends each email over its own SMTP connection, closed after the exchange.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
  config: SmtpConfig,
}

impl SmtpMailer {
  pub fn new(config: SmtpConfig) -> Self { Self { config } }

  pub fn config(&self) -> &SmtpConfig { &self.config }

  fn sender(&self) -> Result<Mailbox, MailError> {
    let address: lettre::Address = self.config.from_email.trim().parse()?;
    Ok(Mailbox::new(self.config.from_name.clone(), address))
  }

  /// Build the MIME message for `email`.
  pub fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
    let message = Message::builder()
      .from(self.sender()?)
      .to(Mailbox::new(None, email.to.to_lettre()))
      .subject(email.subject.clone())
      .header(ContentType::TEXT_PLAIN)
      .body(email.body.clone())?;
    Ok(message)
  }

  fn transport(&self) -> Result<SmtpTransport, MailError> {
    let builder = if self.config.use_tls {
      SmtpTransport::starttls_relay(&self.config.host)?
    } else {
      SmtpTransport::builder_dangerous(self.config.host.as_str())
    };

    let mut builder = builder
      .port(self.config.port)
      .timeout(Some(self.config.timeout));

    if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
      builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
    }

    Ok(builder.build())
  }
}

impl Mailer for SmtpMailer {
  fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
    let message = self.build_message(email)?;
    self.transport()?.send(&message)?;
    Ok(())
  }
}
