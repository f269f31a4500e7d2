//! Handlers for `/status` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/status` | Up to 1000 checks, insertion order |
//! | `POST` | `/status` | Body: `{"client_name":"..."}` |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use tracing::info;
use valentine_core::{
  status::{NewStatusCheck, StatusCheck},
  store::{STATUS_CHECK_LIST_LIMIT, SelectionStore},
};

use crate::{AppState, error::ApiError};

/// `GET /status`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<StatusCheck>>, ApiError>
where
  S: SelectionStore,
{
  let checks = state
    .store
    .list_status_checks(STATUS_CHECK_LIST_LIMIT)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(checks))
}

/// `POST /status`, body: `{"client_name":"..."}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<NewStatusCheck>, JsonRejection>,
) -> Result<Json<StatusCheck>, ApiError>
where
  S: SelectionStore,
{
  let Json(input) = body?;
  let check = StatusCheck::new(input);

  state
    .store
    .insert_status_check(&check)
    .await
    .map_err(ApiError::store)?;

  info!(id = %check.id, client_name = %check.client_name, "status check recorded");
  Ok(Json(check))
}
