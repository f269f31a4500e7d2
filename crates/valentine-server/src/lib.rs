//! Application shell for the Valentine activity backend.
//!
//! Wires the API router under `/api`, applies the cross-origin policy and
//! request tracing, and owns configuration and store lifecycle helpers used by
//! the `valentine` binary.

pub mod settings;

use axum::{
  Router,
  http::{HeaderValue, header::InvalidHeaderValue},
  routing::get,
};
use tower_http::{
  cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
  trace::TraceLayer,
};
use valentine_api::{AppState, api_router};
use valentine_store_sqlite::SqliteStore;

pub use settings::{ServerConfig, StoreLocation};

/// Open the document store described by `config`, creating its directory
/// if needed.
pub async fn open_store(config: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store = match config.store_location() {
    StoreLocation::InMemory => SqliteStore::open_in_memory().await?,
    StoreLocation::File(path) => {
      if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
      }
      SqliteStore::open(&path).await?
    }
  };
  tracing::info!(location = ?config.store_location(), "document store opened");
  Ok(store)
}

/// Build the cross-origin policy for `origins`.
///
/// An empty list or a `*` entry allows any origin by mirroring the request's
/// `Origin`; otherwise only the listed origins are allowed. Credentials, any
/// method and any header are allowed in both cases.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
  if origins.is_empty() || origins.iter().any(|o| o == "*") {
    return Ok(CorsLayer::very_permissive());
  }

  let allowed = origins
    .iter()
    .map(|o| HeaderValue::from_str(o))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(allowed))
      .allow_methods(AllowMethods::mirror_request())
      .allow_headers(AllowHeaders::mirror_request())
      .allow_credentials(true),
  )
}

/// Build the full application router.
pub fn router(state: AppState<SqliteStore>, cors: CorsLayer) -> Router {
  Router::new()
    .route("/api/", get(valentine_api::root))
    .nest("/api", api_router(state))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
  };
  use tower::ServiceExt as _;
  use valentine_notify::Notifier;

  use super::*;

  async fn app(origins: &[&str]) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let origins: Vec<String> = origins.iter().map(|o| (*o).to_owned()).collect();
    router(
      AppState::new(Arc::new(store), Notifier::disabled()),
      cors_layer(&origins).unwrap(),
    )
  }

  fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
      .method(Method::OPTIONS)
      .uri("/api/activity")
      .header(header::ORIGIN, origin)
      .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
      .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
      .body(Body::empty())
      .unwrap()
  }

  #[tokio::test]
  async fn greeting_is_served_with_and_without_trailing_slash() {
    for uri in ["/api", "/api/"] {
      let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
      let resp = app(&["*"]).await.oneshot(req).await.unwrap();
      assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }
  }

  #[tokio::test]
  async fn api_routes_are_nested_under_prefix() {
    let req = Request::builder().uri("/api/activity").body(Body::empty()).unwrap();
    let resp = app(&["*"]).await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/activity").body(Body::empty()).unwrap();
    let resp = app(&["*"]).await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn wildcard_mirrors_any_origin() {
    let resp = app(&["*"]).await.oneshot(preflight("https://anywhere.example")).await.unwrap();
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "https://anywhere.example"
    );
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
      "true"
    );
  }

  #[tokio::test]
  async fn allow_list_rejects_unknown_origin() {
    let app = app(&["https://valentine.example"]).await;

    let resp = app.clone().oneshot(preflight("https://valentine.example")).await.unwrap();
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "https://valentine.example"
    );

    let resp = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
  }

  #[tokio::test]
  async fn open_store_honours_in_memory_location() {
    let cfg = ServerConfig::from_builder(config::Config::builder().add_source(
      config::File::from_str("store_url = \":memory:\"", config::FileFormat::Toml),
    ))
    .unwrap();
    let store = open_store(&cfg).await.unwrap();
    store.close().await.unwrap();
  }

  #[test]
  fn invalid_origin_is_a_config_error() {
    assert!(cors_layer(&["bad\norigin".to_owned()]).is_err());
  }
}
