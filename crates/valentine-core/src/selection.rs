//! Activity selections: a recorded choice of activity, optionally destined
//! for an email notification to a named host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{email::EmailAddress, now_micros};

/// Input accepted by the activity-selection create operation.
///
/// `activity_id` is an external enumeration and is not checked against a
/// catalogue. A malformed `host_email` fails deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct NewActivitySelection {
  pub activity_id:       i64,
  pub activity_title:    String,
  pub activity_emoji:    String,
  #[serde(default)]
  pub activity_response: Option<String>,
  #[serde(default)]
  pub client_hint:       Option<String>,
  #[serde(default)]
  pub recipient_name:    Option<String>,
  #[serde(default)]
  pub host_email:        Option<EmailAddress>,
}

/// A persisted activity selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySelection {
  pub id:                Uuid,
  pub activity_id:       i64,
  pub activity_title:    String,
  pub activity_emoji:    String,
  pub activity_response: Option<String>,
  pub client_hint:       Option<String>,
  pub recipient_name:    Option<String>,
  pub host_email:        Option<EmailAddress>,
  pub timestamp:         DateTime<Utc>,
}

impl ActivitySelection {
  /// Build a record with a fresh id, stamped with the current UTC time.
  pub fn new(input: NewActivitySelection) -> Self {
    Self {
      id:                Uuid::new_v4(),
      activity_id:       input.activity_id,
      activity_title:    input.activity_title,
      activity_emoji:    input.activity_emoji,
      activity_response: input.activity_response,
      client_hint:       input.client_hint,
      recipient_name:    input.recipient_name,
      host_email:        input.host_email,
      timestamp:         now_micros(),
    }
  }
}
