//! Log record representation accepted by the handler.
//!
//! A record is an owned, immutable snapshot of one log event. The calling
//! framework builds it on whatever thread the log call happened and hands it
//! to [`LogstashHandler::emit`](crate::handler::LogstashHandler::emit); the
//! handler never mutates it afterwards. Static `extra` fields configured on
//! the handler are merged in at serialization time only, and only for keys
//! the record does not already carry.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::level::Level;

/// One discrete log event to ship to the collector.
#[derive(Clone, Debug)]
pub struct LogRecord {
    /// Name of the logger that produced this record.
    pub logger: String,
    /// Severity of the event.
    pub level: Level,
    /// The log message content.
    pub message: String,
    /// Creation time, captured when the record was constructed.
    pub timestamp: DateTime<Utc>,
    /// Structured fields attached by the caller.
    pub fields: BTreeMap<String, Value>,
}

impl LogRecord {
    /// Construct a record from logger `name`, `level`, and `message`,
    /// timestamped now.
    pub fn new(logger: &str, level: Level, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            timestamp: Utc::now(),
            fields: BTreeMap::new(),
        }
    }

    /// Attach a structured field, replacing any previous value for the key.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_owned(), value.into());
        self
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} - {}", self.level, self.logger, self.message)
    }
}
