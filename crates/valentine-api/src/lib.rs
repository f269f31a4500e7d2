//! JSON REST API for the Valentine activity backend.
//!
//! Exposes an axum [`Router`] backed by any
//! [`valentine_core::store::SelectionStore`]. CORS, TLS and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", valentine_api::api_router(state))
//! ```

pub mod activity;
pub mod error;
pub mod status;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use valentine_core::store::SelectionStore;
use valentine_notify::Notifier;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub notifier: Notifier,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, notifier: Notifier) -> Self { Self { store, notifier } }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: self.notifier.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: SelectionStore + 'static,
{
  Router::new()
    .route("/", get(root))
    .route("/status", get(status::list::<S>).post(status::create::<S>))
    .route("/activity", get(activity::list::<S>).post(activity::create::<S>))
    .with_state(state)
}

/// `GET /`: liveness greeting.
pub async fn root() -> Json<Value> { Json(json!({ "message": "Hello World" })) }
