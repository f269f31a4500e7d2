//! Process-wide configuration, read once at startup.
//!
//! Values come from an optional TOML file overridden by environment variables
//! (e.g. `SMTP_HOST` sets `smtp_host`). The resulting [`ServerConfig`] is
//! passed explicitly to everything that needs it.

use std::path::{Path, PathBuf};

use config::{
  Config, ConfigError, Environment, File,
  builder::{ConfigBuilder, DefaultState},
};
use serde::{Deserialize, Deserializer, de::IgnoredAny};
use valentine_notify::SmtpSettings;

const IN_MEMORY: &str = ":memory:";

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_listen_addr")]
  pub listen_addr:           String,
  /// Directory holding the database file, or `:memory:`.
  #[serde(default = "default_store_url")]
  pub store_url:             String,
  #[serde(default = "default_db_name")]
  pub db_name:               String,
  pub smtp_host:             Option<String>,
  #[serde(default = "default_smtp_port")]
  pub smtp_port:             u16,
  pub smtp_username:         Option<String>,
  /// Older name for `smtp_username`.
  pub smtp_user:             Option<String>,
  pub smtp_password:         Option<String>,
  pub smtp_from_email:       Option<String>,
  pub smtp_from_name:        Option<String>,
  /// Only a case-insensitive `true` enables STARTTLS; any other text
  /// disables it.
  #[serde(default = "default_true", deserialize_with = "tls_flag")]
  pub smtp_use_tls:          bool,
  /// Comma-separated allowed origins; `*` allows any.
  #[serde(default = "default_cors_origins")]
  pub cors_origins:          String,
  #[serde(default = "default_notify_queue_capacity")]
  pub notify_queue_capacity: usize,
}

fn default_listen_addr() -> String { "0.0.0.0:8000".to_owned() }
fn default_store_url() -> String { ".".to_owned() }
fn default_db_name() -> String { "valentine".to_owned() }
fn default_smtp_port() -> u16 { 587 }
fn default_true() -> bool { true }
fn default_cors_origins() -> String { "*".to_owned() }
fn default_notify_queue_capacity() -> usize { 64 }

fn tls_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Flag {
    Bool(bool),
    Text(String),
    Other(IgnoredAny),
  }

  Ok(match Flag::deserialize(deserializer)? {
    Flag::Bool(b) => b,
    Flag::Text(text) => text.trim().eq_ignore_ascii_case("true"),
    Flag::Other(_) => false,
  })
}

/// Where the document store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
  InMemory,
  File(PathBuf),
}

impl ServerConfig {
  /// Read `path` (if it exists) and then the process environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::default()),
    )
  }

  pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder.build()?.try_deserialize()
  }

  pub fn store_location(&self) -> StoreLocation {
    if self.store_url.trim() == IN_MEMORY {
      return StoreLocation::InMemory;
    }
    let dir = expand_tilde(Path::new(self.store_url.trim()));
    StoreLocation::File(dir.join(format!("{}.sqlite3", self.db_name)))
  }

  /// Mail settings; [`SmtpSettings::resolve`] decides whether they enable
  /// notifications.
  pub fn smtp_settings(&self) -> SmtpSettings {
    let username = self
      .smtp_username
      .clone()
      .filter(|u| !u.trim().is_empty())
      .or_else(|| self.smtp_user.clone());

    SmtpSettings {
      host: self.smtp_host.clone(),
      port: self.smtp_port,
      username,
      password: self.smtp_password.clone(),
      from_email: self.smtp_from_email.clone(),
      from_name: self.smtp_from_name.clone(),
      use_tls: self.smtp_use_tls,
    }
  }

  /// Allowed cross-origin callers, trimmed, empties removed.
  pub fn cors_origins(&self) -> Vec<String> {
    self
      .cors_origins
      .split(',')
      .map(str::trim)
      .filter(|o| !o.is_empty())
      .map(str::to_owned)
      .collect()
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
