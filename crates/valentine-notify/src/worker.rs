//! The notification queue and its dedicated worker.

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use tokio::{
  sync::mpsc::{self, error::TrySendError},
  task::JoinHandle,
};
use tracing::{debug, error, info, warn};
use valentine_core::selection::ActivitySelection;

use crate::{MailError, Mailer, compose};

/// What [`Notifier::notify`] did with a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
  /// Notifications are globally disabled.
  Disabled,
  /// The selection carries no `host_email`.
  NoRecipient,
  /// Handed to the worker.
  Queued,
  /// The queue was full or the worker is gone; the notification is lost.
  Dropped,
}

/// Snapshot of delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
  pub sent:    u64,
  pub failed:  u64,
  pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
  sent:    AtomicU64,
  failed:  AtomicU64,
  dropped: AtomicU64,
}

/// Handle used by request handlers to schedule notifications.
///
/// Cloning is cheap; all clones feed the same worker.
#[derive(Debug, Clone)]
pub struct Notifier {
  queue:    Option<mpsc::Sender<ActivitySelection>>,
  counters: Arc<Counters>,
}

impl Notifier {
  /// A notifier that never sends anything.
  pub fn disabled() -> Self {
    Self { queue: None, counters: Arc::default() }
  }

  /// Start the worker on the current tokio runtime.
  ///
  /// `capacity` bounds the number of notifications waiting for the worker.
  /// The worker exits once every `Notifier` clone has been dropped and the
  /// queue is drained.
  pub fn spawn<M: Mailer>(mailer: M, capacity: usize) -> (Self, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let counters = Arc::new(Counters::default());
    let worker = tokio::spawn(run_worker(Arc::new(mailer), rx, Arc::clone(&counters)));
    (Self { queue: Some(tx), counters }, worker)
  }

  pub fn is_enabled(&self) -> bool { self.queue.is_some() }

  /// Schedule a notification for `selection` without waiting for it.
  pub fn notify(&self, selection: &ActivitySelection) -> Dispatch {
    let Some(queue) = &self.queue else {
      return Dispatch::Disabled;
    };
    if selection.host_email.is_none() {
      return Dispatch::NoRecipient;
    }

    match queue.try_send(selection.clone()) {
      Ok(()) => {
        debug!(selection_id = %selection.id, "notification queued");
        Dispatch::Queued
      }
      Err(TrySendError::Full(dropped) | TrySendError::Closed(dropped)) => {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        warn!(
          selection_id = %dropped.id,
          "notification queue unavailable; notification dropped"
        );
        Dispatch::Dropped
      }
    }
  }

  pub fn stats(&self) -> DeliveryStats {
    DeliveryStats {
      sent:    self.counters.sent.load(Ordering::Relaxed),
      failed:  self.counters.failed.load(Ordering::Relaxed),
      dropped: self.counters.dropped.load(Ordering::Relaxed),
    }
  }
}

async fn run_worker<M: Mailer>(
  mailer: Arc<M>,
  mut queue: mpsc::Receiver<ActivitySelection>,
  counters: Arc<Counters>,
) {
  while let Some(selection) = queue.recv().await {
    deliver(&mailer, &selection, &counters).await;
  }
  debug!("notification queue closed; worker exiting");
}

/// Compose and send one notification. Every failure ends here.
async fn deliver<M: Mailer>(mailer: &Arc<M>, selection: &ActivitySelection, counters: &Counters) {
  let Some(email) = compose(selection) else {
    return;
  };
  let to = email.to.clone();

  // The SMTP exchange blocks; keep it off the async workers.
  let mailer = Arc::clone(mailer);
  let result = tokio::task::spawn_blocking(move || mailer.send(&email))
    .await
    .map_err(|e| MailError::Worker(e.to_string()))
    .and_then(|sent| sent);

  match result {
    Ok(()) => {
      counters.sent.fetch_add(1, Ordering::Relaxed);
      info!(selection_id = %selection.id, %to, "notification email sent");
    }
    Err(e) => {
      counters.failed.fetch_add(1, Ordering::Relaxed);
      error!(
        selection_id = %selection.id,
        %to,
        error = ?e,
        "failed to send notification email: {e}"
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    net::TcpListener,
    sync::{Mutex, mpsc as std_mpsc},
    time::Duration,
  };

  use valentine_core::selection::NewActivitySelection;

  use super::*;
  use crate::{OutgoingEmail, SmtpConfig, SmtpMailer};

  fn selection(host_email: Option<&str>) -> ActivitySelection {
    ActivitySelection::new(NewActivitySelection {
      activity_id:       3,
      activity_title:    "Picnic".into(),
      activity_emoji:    "🧺".into(),
      activity_response: None,
      client_hint:       None,
      recipient_name:    Some("Sam".into()),
      host_email:        host_email.map(|e| e.parse().unwrap()),
    })
  }

  #[derive(Default)]
  struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
  }

  impl Mailer for RecordingMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
      self.sent.lock().unwrap().push(email.clone());
      Ok(())
    }
  }

  struct FailingMailer;

  impl Mailer for FailingMailer {
    fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
      Err(MailError::Transport("connection refused".into()))
    }
  }

  /// Blocks every send until the test releases it.
  struct GatedMailer {
    gate: Mutex<std_mpsc::Receiver<()>>,
  }

  impl Mailer for GatedMailer {
    fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
      self
        .gate
        .lock()
        .unwrap()
        .recv()
        .map_err(|e| MailError::Transport(e.to_string()))
    }
  }

  async fn wait_for(notifier: &Notifier, done: impl Fn(DeliveryStats) -> bool) -> DeliveryStats {
    for _ in 0..500 {
      let stats = notifier.stats();
      if done(stats) {
        return stats;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for delivery; stats = {:?}", notifier.stats());
  }

  #[tokio::test]
  async fn disabled_notifier_does_nothing() {
    let notifier = Notifier::disabled();
    assert!(!notifier.is_enabled());
    assert_eq!(notifier.notify(&selection(Some("h@example.com"))), Dispatch::Disabled);
    assert_eq!(notifier.stats(), DeliveryStats::default());
  }

  #[tokio::test]
  async fn selection_without_host_email_is_skipped() {
    let mailer = RecordingMailer::default();
    let sent = Arc::clone(&mailer.sent);
    let (notifier, _worker) = Notifier::spawn(mailer, 4);

    assert_eq!(notifier.notify(&selection(None)), Dispatch::NoRecipient);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sent.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn queued_selection_is_delivered() {
    let mailer = RecordingMailer::default();
    let sent = Arc::clone(&mailer.sent);
    let (notifier, _worker) = Notifier::spawn(mailer, 4);

    assert_eq!(notifier.notify(&selection(Some("h@example.com"))), Dispatch::Queued);
    let stats = wait_for(&notifier, |s| s.sent == 1).await;
    assert_eq!(stats.failed, 0);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.as_str(), "h@example.com");
    assert_eq!(sent[0].subject, "Sam picked Picnic! 💌");
  }

  #[tokio::test]
  async fn failures_are_counted_and_swallowed() {
    let (notifier, _worker) = Notifier::spawn(FailingMailer, 4);

    notifier.notify(&selection(Some("h@example.com")));
    let stats = wait_for(&notifier, |s| s.failed == 1).await;
    assert_eq!(stats.sent, 0);

    // The worker survives a failure and keeps draining the queue.
    notifier.notify(&selection(Some("h@example.com")));
    wait_for(&notifier, |s| s.failed == 2).await;
  }

  #[tokio::test]
  async fn notify_does_not_wait_for_a_hanging_mailer() {
    let (release, gate) = std_mpsc::channel();
    let mailer = GatedMailer { gate: Mutex::new(gate) };
    let (notifier, _worker) = Notifier::spawn(mailer, 1);

    // The first send hangs in the worker, the second fills the queue, and the
    // third is dropped; none of the calls block.
    assert_eq!(notifier.notify(&selection(Some("h@example.com"))), Dispatch::Queued);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notifier.notify(&selection(Some("h@example.com"))), Dispatch::Queued);
    assert_eq!(notifier.notify(&selection(Some("h@example.com"))), Dispatch::Dropped);
    assert_eq!(notifier.stats().dropped, 1);

    release.send(()).unwrap();
    release.send(()).unwrap();
    let stats = wait_for(&notifier, |s| s.sent == 2).await;
    assert_eq!(stats.failed, 0);
  }

  #[tokio::test]
  async fn refused_smtp_connection_is_one_failure() {
    // Grab a free port, then close it so connecting is refused.
    let port = TcpListener::bind("127.0.0.1:0")
      .unwrap()
      .local_addr()
      .unwrap()
      .port();

    // The worker runs on this thread (current-thread runtime), so a
    // thread-local subscriber sees its events.
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(logs.clone())
      .with_ansi(false)
      .without_time()
      .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut config = SmtpConfig::new("127.0.0.1", "valentine@example.com");
    config.port = port;
    config.use_tls = false;
    config.timeout = Duration::from_secs(2);
    let (notifier, _worker) = Notifier::spawn(SmtpMailer::new(config), 4);

    notifier.notify(&selection(Some("h@example.com")));
    let stats = wait_for(&notifier, |s| s.failed >= 1).await;
    assert_eq!(stats, DeliveryStats { sent: 0, failed: 1, dropped: 0 });

    let output = logs.contents();
    let errors: Vec<&str> = output
      .lines()
      .filter(|l| l.trim_start().starts_with("ERROR"))
      .collect();
    assert_eq!(errors.len(), 1, "log output:\n{output}");
    assert!(errors[0].contains("failed to send notification email"));
    assert!(errors[0].contains("h@example.com"));
  }

  /// Collects formatted log output for assertions.
  #[derive(Clone, Default)]
  struct LogBuffer(Arc<Mutex<Vec<u8>>>);

  impl LogBuffer {
    fn contents(&self) -> String {
      String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
  }

  impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
  }

  impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer { self.clone() }
  }

  #[tokio::test]
  async fn worker_exits_when_notifiers_are_dropped() {
    let (notifier, worker) = Notifier::spawn(RecordingMailer::default(), 4);
    drop(notifier);
    tokio::time::timeout(Duration::from_secs(1), worker)
      .await
      .expect("worker should exit")
      .unwrap();
  }
}
