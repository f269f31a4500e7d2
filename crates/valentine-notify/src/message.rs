//! Composition of the plain-text notification email.

use valentine_core::{EmailAddress, selection::ActivitySelection};

const DEFAULT_RECIPIENT: &str = "Your Valentine";
const NO_MESSAGE: &str = "No custom message provided.";

/// A composed email, ready to hand to a [`Mailer`](crate::Mailer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
  pub to:      EmailAddress,
  pub subject: String,
  pub body:    String,
}

/// Compose the notification for `selection`.
///
/// Returns `None` when the selection has no `host_email`.
pub fn compose(selection: &ActivitySelection) -> Option<OutgoingEmail> {
  let to = selection.host_email.clone()?;
  let recipient = selection
    .recipient_name
    .as_deref()
    .filter(|name| !name.is_empty())
    .unwrap_or(DEFAULT_RECIPIENT);
  let activity = &selection.activity_title;
  let message = selection
    .activity_response
    .as_deref()
    .filter(|msg| !msg.is_empty())
    .unwrap_or(NO_MESSAGE);
  let recorded_at = selection.timestamp.format("%Y-%m-%d %H:%M:%S %Z");

  let body = [
    "Hi there!".to_owned(),
    String::new(),
    format!(
      "{recipient} just chose \"{activity}\" ({}) for your Valentine's adventure.",
      selection.activity_emoji
    ),
    String::new(),
    "Message shown to them:".to_owned(),
    message.to_owned(),
    String::new(),
    format!("Recorded at: {recorded_at}"),
    String::new(),
    "Check the Activity Log for more details.".to_owned(),
    String::new(),
    "With love,".to_owned(),
    "Your Valentine App 💞".to_owned(),
  ]
  .join("\n");

  Some(OutgoingEmail {
    to,
    subject: format!("{recipient} picked {activity}! 💌"),
    body,
  })
}
