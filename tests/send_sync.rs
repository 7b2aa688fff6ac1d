//! The handler is shared across logging threads; pin down its thread-safety.

use logstash_handler::{LogRecord, LogstashHandler, LogstashHandlerBuilder};
use static_assertions::assert_impl_all;

assert_impl_all!(LogstashHandler: Send, Sync);
assert_impl_all!(LogRecord: Send, Sync, Clone);
assert_impl_all!(LogstashHandlerBuilder: Send, Clone);
