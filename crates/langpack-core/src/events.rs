//! Change notifications.
//!
//! Mutations of the registry, catalog and derived sets are announced to
//! every subscriber. Each subscriber has its own unbounded queue, so nothing
//! is dropped while the manager is busy, and the core never waits for a
//! subscriber.

use crate::error::{ErrorCategory, LangpackError};
use crate::package::PackageRecord;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::warn;

/// Receiving half handed out by [`EventSender::subscribe`].
pub type EventReceiver = mpsc::UnboundedReceiver<ManagerEvent>;

/// A notification emitted by the package manager.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    /// A new entry now sits at `index` in the registry.
    PackageInserted { index: usize },
    /// The entry previously at `index` was removed.
    PackageRemoved { index: usize },
    /// The entry at `index` was updated in place.
    EntryChanged { index: usize },
    /// The "new" and "outdated" sets were recomputed.
    AvailabilityChanged {
        new_count: usize,
        outdated_count: usize,
    },
    FetchStarted,
    FetchFinished,
    /// An archive was installed and registered.
    PackageInstalled(PackageRecord),
    Error {
        category: ErrorCategory,
        message: String,
    },
}

/// Sending half of the notification channel.
///
/// Cheap to clone; clones share the subscriber list. Sending never fails:
/// with no live subscriber the event is dropped, and subscribers whose
/// receiver was dropped are pruned on the next emit.
#[derive(Debug, Clone, Default)]
pub struct EventSender {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<ManagerEvent>>>>,
}

impl EventSender {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<ManagerEvent>>> {
        // A panic while holding the lock cannot leave the list half-updated.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Subscribe to all events emitted from now on.
    pub fn subscribe(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push(tx);
        rx
    }

    pub fn emit(&self, event: ManagerEvent) {
        self.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Log an error and emit it as an [`ManagerEvent::Error`].
    pub fn emit_error(&self, err: &LangpackError) {
        warn!("{}", err);
        self.emit(ManagerEvent::Error {
            category: err.category(),
            message: err.to_string(),
        });
    }
}
