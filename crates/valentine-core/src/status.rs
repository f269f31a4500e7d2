//! Status checks, lightweight heartbeat records used to verify connectivity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::now_micros;

/// Input accepted by the status-check create operation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStatusCheck {
  pub client_name: String,
}

/// A persisted status check. The `id` and `timestamp` are server-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheck {
  pub id:          Uuid,
  pub client_name: String,
  pub timestamp:   DateTime<Utc>,
}

impl StatusCheck {
  /// Build a record with a fresh id, stamped with the current UTC time.
  pub fn new(input: NewStatusCheck) -> Self {
    Self {
      id:          Uuid::new_v4(),
      client_name: input.client_name,
      timestamp:   now_micros(),
    }
  }
}
