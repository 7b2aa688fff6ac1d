//! Handler configuration and defaults.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use crate::level::Level;

/// Default bound on `wait_closed` draining the worker.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default mean delay between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);
/// Default standard deviation of the reconnect delay.
pub const DEFAULT_RECONNECT_JITTER: Duration = Duration::from_millis(300);
/// Default capacity of the pending-record queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Tuning knobs for a [`LogstashHandler`](crate::handler::LogstashHandler).
///
/// Built through [`LogstashHandlerBuilder`](crate::builder::LogstashHandlerBuilder),
/// which validates the values.
#[derive(Clone, Debug)]
pub struct HandlerConfig {
    /// Records below this severity are ignored by `emit`.
    pub level: Level,
    /// Hard deadline for `wait_closed`.
    pub close_timeout: Duration,
    /// Mean reconnect delay.
    pub reconnect_delay: Duration,
    /// Reconnect delay jitter (standard deviation).
    pub reconnect_jitter: Duration,
    /// Maximum number of pending records before drop-oldest kicks in.
    pub queue_capacity: usize,
    /// Static fields merged into every event for keys the record lacks.
    pub extra: BTreeMap<String, Value>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            level: Level::Trace,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            reconnect_jitter: DEFAULT_RECONNECT_JITTER,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            extra: BTreeMap::new(),
        }
    }
}
