//! Syntactically validated email addresses.
//!
//! Validation happens when the value is constructed, which for request bodies
//! means during deserialization. A malformed address never reaches a handler.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// An email address that passed RFC 5321 syntax checks.
///
/// Serialises as a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(lettre::Address);

impl EmailAddress {
  pub fn as_str(&self) -> &str { self.0.as_ref() }

  /// The parsed form used by the mail transport.
  pub fn to_lettre(&self) -> lettre::Address { self.0.clone() }
}

impl FromStr for EmailAddress {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    lettre::Address::from_str(s.trim())
      .map(Self)
      .map_err(|e| Error::InvalidEmail {
        input:  s.to_owned(),
        reason: e.to_string(),
      })
  }
}

impl TryFrom<String> for EmailAddress {
  type Error = Error;

  fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<EmailAddress> for String {
  fn from(value: EmailAddress) -> Self { value.0.to_string() }
}

impl fmt::Display for EmailAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
