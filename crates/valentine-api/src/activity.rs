//! Handlers for `/activity` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/activity` | Up to 100 selections, newest first |
//! | `POST` | `/activity` | Body: [`NewActivitySelection`]; schedules a notification |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use tracing::info;
use valentine_core::{
  selection::{ActivitySelection, NewActivitySelection},
  store::{ACTIVITY_LIST_LIMIT, SelectionStore},
};

use crate::{AppState, error::ApiError};

/// `GET /activity`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<ActivitySelection>>, ApiError>
where
  S: SelectionStore,
{
  let selections = state
    .store
    .list_activity_selections(ACTIVITY_LIST_LIMIT)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(selections))
}

/// `POST /activity`
///
/// The record is persisted before the notification is scheduled, and the
/// response never waits for the notification.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<NewActivitySelection>, JsonRejection>,
) -> Result<Json<ActivitySelection>, ApiError>
where
  S: SelectionStore,
{
  let Json(input) = body?;
  let selection = ActivitySelection::new(input);

  state
    .store
    .insert_activity_selection(&selection)
    .await
    .map_err(ApiError::store)?;

  let dispatch = state.notifier.notify(&selection);
  info!(
    id = %selection.id,
    activity_id = selection.activity_id,
    notification = ?dispatch,
    "activity selection recorded"
  );
  Ok(Json(selection))
}
