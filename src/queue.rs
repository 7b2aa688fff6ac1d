//! Bounded FIFO queue shared between the handler façade and the worker.
//!
//! The queue is the single hand-off point between producers (any thread
//! calling `emit`) and the one delivery worker. Producers are serialized
//! through the internal mutex, so the queue behaves as a single-writer actor
//! regardless of how many threads log concurrently. Overflow evicts the
//! oldest record rather than rejecting the newest: under sustained load the
//! queue always holds the most recent `capacity` records.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::record::LogRecord;

/// Element type carried by the queue.
///
/// Shutdown is signalled in-band with an explicit variant instead of a magic
/// record value, so the consumer dispatches on a tag.
#[derive(Debug)]
pub(crate) enum QueueItem {
    Record(LogRecord),
    /// Terminal marker appended by `close()`; never serialized.
    Close,
}

/// Result of offering a record to the queue.
#[derive(Debug)]
pub(crate) enum PushOutcome {
    /// The record was appended; `evicted` holds the oldest record dropped to
    /// make room, if the queue was full.
    Enqueued { evicted: Option<LogRecord> },
    /// The queue is closing and no longer accepts records.
    Rejected(LogRecord),
}

struct Inner {
    items: VecDeque<QueueItem>,
    /// Set once the close marker has been appended; no records after that.
    closing: bool,
    /// Set by `cancel()`; wakes and fails any blocked `pop`.
    cancelled: bool,
}

/// Fixed-capacity FIFO with drop-oldest overflow and a blocking consumer side.
pub(crate) struct BoundedQueue {
    inner: Mutex<Inner>,
    not_empty: Condvar,
    capacity: usize,
}

impl BoundedQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity.min(1024)),
                closing: false,
                cancelled: false,
            }),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Append a record, evicting the oldest one first when full.
    ///
    /// The `closing` flag is checked under the same lock that guards the
    /// items, so a record can never land behind the close marker.
    pub fn push(&self, record: LogRecord) -> PushOutcome {
        let mut inner = self.inner.lock();
        if inner.closing {
            return PushOutcome::Rejected(record);
        }
        let evicted = if inner.items.len() >= self.capacity {
            // No marker is present before `closing` is set, so the front is
            // always a real record here.
            match inner.items.pop_front() {
                Some(QueueItem::Record(oldest)) => Some(oldest),
                _ => None,
            }
        } else {
            None
        };
        inner.items.push_back(QueueItem::Record(record));
        self.not_empty.notify_one();
        PushOutcome::Enqueued { evicted }
    }

    /// Append the close marker, evicting the oldest record first when full.
    ///
    /// Returns `None` when the queue was already closing, otherwise the
    /// record evicted to make room (if any). The marker itself does not count
    /// against capacity beyond that one eviction.
    pub fn push_close(&self) -> Option<Option<LogRecord>> {
        let mut inner = self.inner.lock();
        if inner.closing {
            return None;
        }
        inner.closing = true;
        let evicted = if inner.items.len() >= self.capacity {
            match inner.items.pop_front() {
                Some(QueueItem::Record(oldest)) => Some(oldest),
                _ => None,
            }
        } else {
            None
        };
        inner.items.push_back(QueueItem::Close);
        self.not_empty.notify_one();
        Some(evicted)
    }

    /// Re-append the close marker after the worker consumed it, so shutdown
    /// can verify it was the terminal item.
    pub fn reinsert_close(&self) {
        let mut inner = self.inner.lock();
        inner.items.push_back(QueueItem::Close);
    }

    /// Remove and return the next item, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue has been cancelled.
    pub fn pop(&self) -> Option<QueueItem> {
        let mut inner = self.inner.lock();
        loop {
            if inner.cancelled {
                return None;
            }
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            self.not_empty.wait(&mut inner);
        }
    }

    /// Wake any blocked `pop` and make all future pops fail. Items already
    /// queued are left in place for the shutdown drain.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        inner.cancelled = true;
        self.not_empty.notify_all();
    }

    /// Take every remaining item, for the post-shutdown invariant check.
    pub fn drain(&self) -> Vec<QueueItem> {
        let mut inner = self.inner.lock();
        inner.items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }
}
