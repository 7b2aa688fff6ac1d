//! Delivery worker: the queue's single consumer.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::warn;
use serde_json::Value;

use crate::cancel::CancelToken;
use crate::manager::{Cancelled, ConnectionManager};
use crate::queue::{BoundedQueue, QueueItem};
use crate::record::LogRecord;
use crate::serialize::serialize_event;

/// Runs on the handler's background thread for its entire lifetime.
pub(crate) struct DeliveryWorker {
    queue: Arc<BoundedQueue>,
    manager: ConnectionManager,
    cancel: CancelToken,
    extra: BTreeMap<String, Value>,
}

impl DeliveryWorker {
    pub fn new(
        queue: Arc<BoundedQueue>,
        manager: ConnectionManager,
        cancel: CancelToken,
        extra: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            queue,
            manager,
            cancel,
            extra,
        }
    }

    /// Consume the queue until the close marker or cancellation.
    ///
    /// The manager is handed back so shutdown can disconnect it after the
    /// thread has been joined.
    pub fn run(mut self) -> ConnectionManager {
        while !self.cancel.is_cancelled() {
            let Some(item) = self.queue.pop() else {
                break;
            };
            match item {
                QueueItem::Close => {
                    // Put the marker back so shutdown can verify it was the
                    // terminal item. Sole normal termination path.
                    self.queue.reinsert_close();
                    break;
                }
                QueueItem::Record(record) => {
                    if self.deliver(record).is_err() {
                        break;
                    }
                }
            }
        }
        self.manager
    }

    /// Serialize and send one record.
    ///
    /// A serialization failure is isolated to the record. A transport failure
    /// costs the record (delivery is at-most-once, the failed payload is
    /// never retried) and runs the reconnect protocol before the next
    /// dequeue. `Err` means the worker was cancelled mid-reconnect.
    fn deliver(&mut self, record: LogRecord) -> Result<(), Cancelled> {
        let payload = match serialize_event(&record, &self.extra) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to serialize log record \"{record}\": {err}");
                return Ok(());
            }
        };
        if let Err(err) = self.manager.send(&payload) {
            warn!("send failed, log record lost: \"{record}\" ({err})");
            self.manager.reconnect(&self.cancel)?;
        }
        Ok(())
    }
}
