//! Builder for [`LogstashHandler`](crate::handler::LogstashHandler).
//!
//! Validates the configuration and performs the first connection
//! synchronously: a handler is only ever returned with a live connection and
//! a running worker, so the only error a caller can observe after
//! construction is through the side-channel log.

use std::io;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::config::HandlerConfig;
use crate::handler::LogstashHandler;
use crate::level::Level;
use crate::transport::{TcpTransport, Transport};

/// Errors surfaced while constructing a handler.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
    /// The initial connection to the collector failed, or the worker thread
    /// could not be spawned. The handler is unusable and must be discarded.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Fluent construction for [`LogstashHandler`].
#[derive(Clone, Debug, Default)]
pub struct LogstashHandlerBuilder {
    endpoint: Option<(String, u16)>,
    connect_timeout: Option<Duration>,
    config: HandlerConfig,
}

impl LogstashHandlerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a Logstash TCP input at `host:port`.
    pub fn with_tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.endpoint = Some((host.into(), port));
        self
    }

    /// Bound each TCP connection attempt.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Ignore records below `level`.
    pub fn with_level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    /// Bound how long `wait_closed` waits for the queue to drain.
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.config.close_timeout = timeout;
        self
    }

    /// Mean delay between reconnect attempts.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_delay = delay;
        self
    }

    /// Jitter (standard deviation) applied to the reconnect delay.
    pub fn with_reconnect_jitter(mut self, jitter: Duration) -> Self {
        self.config.reconnect_jitter = jitter;
        self
    }

    /// Capacity of the pending-record queue.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Add one static field merged into every event the record does not
    /// already carry.
    pub fn with_extra_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.extra.insert(key.into(), value.into());
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.config.queue_capacity == 0 {
            return Err(BuildError::InvalidConfig(
                "queue_capacity must be greater than zero".into(),
            ));
        }
        if self.config.close_timeout.is_zero() {
            return Err(BuildError::InvalidConfig(
                "close_timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Connect to the configured TCP endpoint and start the handler.
    pub fn build(self) -> Result<LogstashHandler, BuildError> {
        let (host, port) = self
            .endpoint
            .clone()
            .ok_or_else(|| BuildError::InvalidConfig("tcp endpoint is required".into()))?;
        let mut transport = TcpTransport::new(host, port);
        if let Some(timeout) = self.connect_timeout {
            transport = transport.with_connect_timeout(timeout);
        }
        self.build_with_transport(Box::new(transport))
    }

    /// Start the handler over a caller-supplied transport.
    pub fn build_with_transport(
        self,
        mut transport: Box<dyn Transport>,
    ) -> Result<LogstashHandler, BuildError> {
        self.validate()?;
        // The one failure surfaced to the creator: every later connection
        // problem is handled by the reconnect protocol.
        let connection = transport.connect()?;
        LogstashHandler::start(self.config, transport, connection).map_err(BuildError::Io)
    }
}
