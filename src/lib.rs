//! Buffered, reconnecting log forwarding to a Logstash collector.
//!
//! A [`LogstashHandler`] accepts log records synchronously from whatever
//! logging layer an application uses, buffers them in a bounded queue, and
//! ships them over a persistent TCP connection from a background worker
//! thread. Connection loss never reaches the caller: the worker reconnects
//! with jittered backoff and keeps going, at the cost of dropping the record
//! that was in flight (delivery is at-most-once). Under sustained
//! backpressure the queue drops its oldest entries, preferring recency over
//! completeness; every drop is reported through the [`log`] crate.
//!
//! ```no_run
//! use logstash_handler::{Level, LogRecord, LogstashHandlerBuilder};
//!
//! # fn main() -> Result<(), logstash_handler::BuildError> {
//! let handler = LogstashHandlerBuilder::new()
//!     .with_tcp("logstash.internal", 5000)
//!     .with_extra_field("service", "billing")
//!     .build()?;
//!
//! handler.emit(LogRecord::new("billing.worker", Level::Info, "invoice sent"));
//!
//! handler.close();
//! handler.wait_closed();
//! # Ok(())
//! # }
//! ```

mod backoff;
mod cancel;
mod config;
mod handler;
mod level;
mod manager;
mod queue;
mod record;
mod serialize;
mod worker;

pub mod builder;
pub mod transport;

pub use builder::{BuildError, LogstashHandlerBuilder};
pub use config::{
    DEFAULT_CLOSE_TIMEOUT, DEFAULT_QUEUE_CAPACITY, DEFAULT_RECONNECT_DELAY,
    DEFAULT_RECONNECT_JITTER, HandlerConfig,
};
pub use handler::LogstashHandler;
pub use level::Level;
pub use record::LogRecord;
pub use transport::{Connection, Interrupt, TcpTransport, Transport};
