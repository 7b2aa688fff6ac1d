//! Public handler façade: accepts records, owns the queue and the worker.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use log::{error, warn};
use parking_lot::Mutex;

use crate::backoff::ReconnectBackoff;
use crate::cancel::CancelToken;
use crate::config::HandlerConfig;
use crate::level::Level;
use crate::manager::{ConnectionManager, InterruptSlot};
use crate::queue::{BoundedQueue, PushOutcome, QueueItem};
use crate::record::LogRecord;
use crate::transport::{Connection, Transport};
use crate::worker::DeliveryWorker;

const STATE_OPEN: u8 = 0;
const STATE_CLOSING: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// Ships log records to a Logstash collector over a persistent connection.
///
/// `emit` never blocks on I/O and never fails the caller; the background
/// worker drains the bounded queue and absorbs every transport fault through
/// the reconnect protocol. Under sustained backpressure the oldest pending
/// records are dropped (and reported via the `log` side-channel) in favour of
/// recent ones.
///
/// Constructed through [`LogstashHandlerBuilder`](crate::builder::LogstashHandlerBuilder);
/// construction is the only point where a connection error reaches the
/// caller.
pub struct LogstashHandler {
    queue: Arc<BoundedQueue>,
    state: AtomicU8,
    cancel: CancelToken,
    interrupt: InterruptSlot,
    worker: Mutex<Option<JoinHandle<ConnectionManager>>>,
    done: Receiver<()>,
    close_timeout: Duration,
    level: Level,
}

impl LogstashHandler {
    /// Spawn the delivery worker around an already-connected transport.
    pub(crate) fn start(
        config: HandlerConfig,
        transport: Box<dyn Transport>,
        connection: Box<dyn Connection>,
    ) -> io::Result<Self> {
        let queue = Arc::new(BoundedQueue::new(config.queue_capacity));
        let cancel = CancelToken::new();
        let interrupt = InterruptSlot::default();
        let backoff = ReconnectBackoff::new(config.reconnect_delay, config.reconnect_jitter);
        let manager = ConnectionManager::new(transport, connection, backoff, interrupt.clone());
        let worker = DeliveryWorker::new(
            Arc::clone(&queue),
            manager,
            cancel.clone(),
            config.extra,
        );
        let (done_tx, done_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("logstash-delivery".into())
            .spawn(move || {
                let manager = worker.run();
                let _ = done_tx.send(());
                manager
            })?;
        Ok(Self {
            queue,
            state: AtomicU8::new(STATE_OPEN),
            cancel,
            interrupt,
            worker: Mutex::new(Some(handle)),
            done: done_rx,
            close_timeout: config.close_timeout,
            level: config.level,
        })
    }

    /// Enqueue one record for delivery. Callable from any thread.
    ///
    /// Never blocks and never fails: a record arriving after `close()` is
    /// reported as skipped, and a record arriving on a full queue evicts the
    /// oldest pending one (also reported).
    pub fn emit(&self, record: LogRecord) {
        if record.level < self.level {
            return;
        }
        if self.state.load(Ordering::Acquire) != STATE_OPEN {
            warn!("log record skipped, handler is shutting down: \"{record}\"");
            return;
        }
        match self.queue.push(record) {
            PushOutcome::Enqueued { evicted: Some(oldest) } => {
                warn!("queue is full, dropped oldest log record: \"{oldest}\"");
            }
            PushOutcome::Enqueued { evicted: None } => {}
            // close() won the race between our state check and the push.
            PushOutcome::Rejected(record) => {
                warn!("log record skipped, handler is shutting down: \"{record}\"");
            }
        }
    }

    /// Stop accepting records and ask the worker to finish. Idempotent; does
    /// not wait for the queue to drain.
    pub fn close(&self) {
        if self
            .state
            .compare_exchange(STATE_OPEN, STATE_CLOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        if let Some(Some(evicted)) = self.queue.push_close() {
            warn!("queue is full, dropped oldest log record before closing: \"{evicted}\"");
        }
    }

    /// Wait for the worker to finish, up to the configured close timeout.
    ///
    /// On timeout the worker is cancelled: the cancel token stops its loop
    /// and backoff sleeps, the queue releases a blocked dequeue, and any
    /// in-flight send is interrupted through the connection's interrupter.
    /// Either way the connection is torn down before returning. Always
    /// returns; the timeout is resolved internally, never surfaced. Safe to
    /// call repeatedly; later calls return immediately.
    pub fn wait_closed(&self) {
        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        let finished = match self.done.recv_timeout(self.close_timeout) {
            Ok(()) => true,
            // The worker exited without acking (it panicked); join reports it.
            Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        };
        if !finished {
            self.cancel.cancel();
            self.queue.cancel();
            self.interrupt.interrupt();
        }
        match handle.join() {
            Ok(mut manager) => manager.disconnect(),
            Err(_) => error!("logstash delivery worker panicked"),
        }
        self.verify_drained();
        self.state.store(STATE_CLOSED, Ordering::Release);
    }

    /// The queue must end holding exactly the close marker (or nothing, when
    /// cancellation raced the worker between consuming and re-inserting it).
    /// Anything else means records were stranded; report them rather than
    /// ignore them.
    fn verify_drained(&self) {
        let mut stranded = 0usize;
        for item in self.queue.drain() {
            if let QueueItem::Record(record) = item {
                stranded += 1;
                warn!("log record discarded at shutdown: \"{record}\"");
            }
        }
        if stranded > 0 {
            error!("queue was not drained at shutdown: {stranded} records discarded");
        }
    }

    /// Whether `wait_closed` has completed.
    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_CLOSED
    }
}

impl Drop for LogstashHandler {
    fn drop(&mut self) {
        self.close();
        self.wait_closed();
    }
}

impl std::fmt::Debug for LogstashHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogstashHandler")
            .field("pending", &self.queue.len())
            .field("close_timeout", &self.close_timeout)
            .field("closed", &self.is_closed())
            .finish()
    }
}
