//! Encoding and decoding between domain records and stored JSON documents.
//!
//! Documents are flat JSON objects. The `timestamp` field is stored as an
//! RFC 3339 string with fixed microsecond precision and a `+00:00` offset, so
//! comparing the stored text orders documents chronologically.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{Collection, Error, Result};

const TIMESTAMP_FIELD: &str = "timestamp";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Parse a stored timestamp. Offset-less values are taken to be UTC.
pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Serialise `record` into the document text stored for `collection`.
pub fn encode_document<T: Serialize>(
  collection: Collection,
  record: &T,
) -> Result<String> {
  let mut doc = into_object(collection, serde_json::to_value(record)?)?;

  if let Some(canonical) = stored_timestamp(&doc)?.map(encode_dt) {
    doc.insert(TIMESTAMP_FIELD.to_owned(), Value::String(canonical));
  }

  Ok(Value::Object(doc).to_string())
}

/// Decode stored document text back into a domain record.
///
/// The stored timestamp string is parsed into a structured timestamp before
/// the record is built; an unparseable timestamp is an error.
pub fn decode_document<T: DeserializeOwned>(
  collection: Collection,
  text: &str,
) -> Result<T> {
  let mut doc = into_object(collection, serde_json::from_str::<Value>(text)?)?;
  doc.remove("_id");

  if let Some(decoded) = stored_timestamp(&doc)? {
    doc.insert(TIMESTAMP_FIELD.to_owned(), serde_json::to_value(decoded)?);
  }

  Ok(serde_json::from_value(Value::Object(doc))?)
}

/// The document's timestamp, if it is held as a string.
fn stored_timestamp(doc: &Map<String, Value>) -> Result<Option<DateTime<Utc>>> {
  match doc.get(TIMESTAMP_FIELD) {
    Some(Value::String(raw)) => decode_dt(raw).map(Some),
    _ => Ok(None),
  }
}

fn into_object(collection: Collection, value: Value) -> Result<Map<String, Value>> {
  match value {
    Value::Object(map) => Ok(map),
    _ => Err(Error::NotAnObject { collection: collection.name() }),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn encoded_timestamps_have_fixed_width() {
    let whole = Utc.with_ymd_and_hms(2025, 2, 14, 10, 0, 0).unwrap();
    let frac = whole + chrono::Duration::microseconds(5);
    assert_eq!(encode_dt(whole), "2025-02-14T10:00:00.000000+00:00");
    assert_eq!(encode_dt(frac), "2025-02-14T10:00:00.000005+00:00");
    assert!(encode_dt(whole) < encode_dt(frac));
  }

  #[test]
  fn decodes_offsetless_timestamp_as_utc() {
    let dt = decode_dt("2025-02-14T10:00:00.250000").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2025, 2, 14, 10, 0, 0).unwrap()
      + chrono::Duration::milliseconds(250));
  }

  #[test]
  fn rejects_garbage_timestamp() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn non_object_documents_are_rejected() {
    let err = encode_document(Collection::StatusChecks, &vec![1, 2, 3]).unwrap_err();
    assert!(matches!(err, Error::NotAnObject { collection: "status_checks" }));
  }
}
