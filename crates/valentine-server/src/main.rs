//! Valentine activity backend binary.
//!
//! Loads `.env` and `config.toml` (or the path given with `--config`), opens
//! the document store, starts the notification worker when mail is
//! configured, and serves the API under `/api`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use valentine_api::AppState;
use valentine_notify::{Notifier, SmtpMailer};
use valentine_server::{ServerConfig, cors_layer, open_store, router};

#[derive(Parser)]
#[command(author, version, about = "Valentine activity backend")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Load .env if present.
  let _ = dotenvy::dotenv();

  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  // Open the store; one connection for the life of the process.
  let store = open_store(&server_cfg)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_location()))?;
  let store = Arc::new(store);

  // Notifications are enabled only when a mail host and sender are set.
  let notifier = match server_cfg.smtp_settings().resolve() {
    Some(smtp) => {
      info!(host = %smtp.host, port = smtp.port, tls = smtp.use_tls, "email notifications enabled");
      let (notifier, _worker) =
        Notifier::spawn(SmtpMailer::new(smtp), server_cfg.notify_queue_capacity);
      notifier
    }
    None => {
      info!("email notifications disabled: SMTP_HOST or SMTP_FROM_EMAIL not set");
      Notifier::disabled()
    }
  };

  let origins = server_cfg.cors_origins();
  let cors = cors_layer(&origins).context("invalid CORS_ORIGINS entry")?;
  info!(?origins, "cross-origin policy configured");

  let app = router(AppState::new(Arc::clone(&store), notifier), cors);
  let address = &server_cfg.listen_addr;

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  // Pending notifications are abandoned here.
  Arc::unwrap_or_clone(store)
    .close()
    .await
    .context("failed to close store")?;

  info!("shutdown complete");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      error!(error = %e, "failed to install Ctrl+C handler");
      std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
        info!("received SIGTERM, shutting down");
      }
      Err(e) => {
        error!(error = %e, "failed to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}
