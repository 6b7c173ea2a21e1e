//! Delivery of settings reloads to the client manager.
//!
//! Whatever notices new settings (the binary listens for `SIGHUP` and
//! re-reads `.env`) publishes a [`ChangeEvent`]; the manager's watch task,
//! started with [`ClientManager::spawn_watch`](super::ClientManager::spawn_watch),
//! applies them in order. Events carry the full raw settings rather than
//! a diff, so applying only the most recent one is always enough.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::config::RawOptions;

/// A complete set of database settings to rebuild the client from.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// The replacement settings. Validated only when applied, so a bad
    /// reload is rejected by the manager, not by the publisher.
    pub options: RawOptions,
    /// What triggered the reload (e.g. `"SIGHUP"`); logged with the outcome.
    pub reason: String,
    /// When the new settings were read.
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Creates an event stamped with the current time.
    pub fn new(options: RawOptions, reason: impl Into<String>) -> Self {
        Self {
            options,
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Queue of pending reloads between publishers and the manager.
///
/// A watcher that falls more than `capacity` events behind skips the
/// overflow and continues with the newest settings; superseded reloads are
/// never worth applying. Publishing with no watcher attached is not an
/// error, the reload is simply not applied.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// Creates a bus that buffers up to `capacity` unapplied reloads.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Queues a reload. Returns how many watchers will see it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Attaches a watcher; it sees reloads published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Number of attached watchers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
