//! Outbound connection lifecycle: connect, send, disconnect, reconnect.

use std::io;
use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;

use crate::backoff::ReconnectBackoff;
use crate::cancel::CancelToken;
use crate::transport::{Connection, Interrupt, Transport};

/// Signals that the worker was cancelled while inside the reconnect loop.
#[derive(Debug)]
pub(crate) struct Cancelled;

/// Shared slot the façade uses to abort an in-flight send.
///
/// The manager keeps it pointed at the interrupter of whichever connection is
/// currently live; a forced shutdown fires it without touching the connection
/// itself, which stays exclusively owned by the worker thread.
#[derive(Clone, Default)]
pub(crate) struct InterruptSlot {
    inner: Arc<Mutex<Option<Box<dyn Interrupt>>>>,
}

impl InterruptSlot {
    pub fn interrupt(&self) {
        if let Some(interrupter) = self.inner.lock().as_ref() {
            interrupter.interrupt();
        }
    }

    fn install(&self, connection: &dyn Connection) {
        *self.inner.lock() = Some(connection.interrupter());
    }

    fn clear(&self) {
        *self.inner.lock() = None;
    }
}

/// Owns the transport and the live connection, if any.
///
/// `Connected` and `Disconnected` are represented by the `connection` option;
/// the reconnect loop is the only place the machine lingers in between.
pub(crate) struct ConnectionManager {
    transport: Box<dyn Transport>,
    connection: Option<Box<dyn Connection>>,
    backoff: ReconnectBackoff,
    interrupt: InterruptSlot,
}

impl ConnectionManager {
    /// Wrap an already-established connection (the synchronous first connect
    /// performed at construction time).
    pub fn new(
        transport: Box<dyn Transport>,
        connection: Box<dyn Connection>,
        backoff: ReconnectBackoff,
        interrupt: InterruptSlot,
    ) -> Self {
        interrupt.install(connection.as_ref());
        Self {
            transport,
            connection: Some(connection),
            backoff,
            interrupt,
        }
    }

    /// Write one payload to the live connection.
    ///
    /// Any error, including having no connection, is a transport-level
    /// failure and sends the caller into [`ConnectionManager::reconnect`].
    pub fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        match self.connection.as_mut() {
            Some(connection) => connection.send(payload),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "no live connection",
            )),
        }
    }

    /// Drop any live connection. Safe to call when already disconnected.
    pub fn disconnect(&mut self) {
        self.interrupt.clear();
        self.connection = None;
    }

    /// Tear down the stale connection and retry until a fresh one is up.
    ///
    /// Retries indefinitely, sleeping a jittered delay between attempts. The
    /// only early exit is cancellation, reported back so the worker can
    /// terminate instead of swallowing it.
    pub fn reconnect(&mut self, cancel: &CancelToken) -> Result<(), Cancelled> {
        info!("logstash transport disconnected");
        self.disconnect();
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            match self.transport.connect() {
                Ok(connection) => {
                    self.interrupt.install(connection.as_ref());
                    self.connection = Some(connection);
                    info!("logstash transport reconnected");
                    return Ok(());
                }
                Err(err) => {
                    let delay = self.backoff.next_delay();
                    warn!("logstash reconnect attempt failed: {err}; next attempt in {delay:?}");
                    if cancel.sleep(delay) {
                        return Err(Cancelled);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}
