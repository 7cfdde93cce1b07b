//! Completion tracking across every task of a copy
//!
//! The tracker counts entries that have been scheduled but not finished. Each
//! scheduled entry owns a [`PendingGuard`]; dropping the last guard, or
//! aborting, fires the terminal notification. The sender lives in an `Option`
//! that is taken on first use, so the notification is delivered at most once
//! no matter how many tasks race to deliver it.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::trace;

/// How a copy reached its end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every scheduled entry finished
    Drained,
    /// A stop-on-error failure ended the copy early
    Aborted,
}

/// Shared pending-entry counter with a one-time terminal notification
#[derive(Debug)]
pub struct CompletionTracker {
    pending: AtomicUsize,
    closed: AtomicBool,
    notify: Mutex<Option<oneshot::Sender<Termination>>>,
}

impl CompletionTracker {
    /// Start tracking with the root entry already scheduled.
    ///
    /// Returns the tracker, the root's guard and the receiving end of the
    /// terminal notification.
    pub fn start() -> (Arc<Self>, PendingGuard, oneshot::Receiver<Termination>) {
        let (sender, receiver) = oneshot::channel();
        let tracker = Arc::new(Self {
            pending: AtomicUsize::new(1),
            closed: AtomicBool::new(false),
            notify: Mutex::new(Some(sender)),
        });
        let guard = PendingGuard {
            tracker: Arc::clone(&tracker),
        };
        (tracker, guard, receiver)
    }

    /// Schedule one more entry.
    ///
    /// Returns `None` once the copy has been aborted; nothing new may start
    /// after that.
    pub fn schedule(self: &Arc<Self>) -> Option<PendingGuard> {
        if self.is_closed() {
            return None;
        }
        self.pending.fetch_add(1, Ordering::AcqRel);
        Some(PendingGuard {
            tracker: Arc::clone(self),
        })
    }

    /// End the copy now. Entries already running keep going but nothing new
    /// is scheduled.
    pub fn abort(&self) {
        self.closed.store(true, Ordering::Release);
        if self.fire(Termination::Aborted) {
            trace!("Copy aborted with {} entries in flight", self.pending());
        }
    }

    /// Whether the copy has been aborted
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Entries scheduled and not yet finished
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Whether the terminal notification has been sent
    pub fn has_fired(&self) -> bool {
        self.notify.lock().is_none()
    }

    fn complete(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 && self.fire(Termination::Drained) {
            trace!("All entries finished");
        }
    }

    fn fire(&self, termination: Termination) -> bool {
        let sender = self.notify.lock().take();
        match sender {
            Some(sender) => {
                // The receiver may already be gone if the caller stopped waiting.
                let _ = sender.send(termination);
                true
            }
            None => false,
        }
    }
}

/// Marks one scheduled entry; finishing the entry means dropping the guard.
///
/// Because completion happens on drop, an entry whose task panics still
/// counts as finished.
#[derive(Debug)]
pub struct PendingGuard {
    tracker: Arc<CompletionTracker>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.tracker.complete();
    }
}
