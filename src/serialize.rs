//! Logstash event format (v1) encoding.
//!
//! Each record becomes one JSON object terminated by a newline, the framing
//! Logstash's `json_lines` codec expects on a TCP input.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::record::LogRecord;

const EVENT_VERSION: &str = "1";
/// ISO 8601 UTC with millisecond precision, e.g. `2026-08-23T10:15:30.123Z`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Encode `record` as a newline-terminated Logstash v1 event.
///
/// `extra` supplies static default fields; a key already present on the
/// record (or colliding with one of the reserved event keys) is left alone.
pub(crate) fn serialize_event(
    record: &LogRecord,
    extra: &BTreeMap<String, Value>,
) -> Result<Vec<u8>, serde_json::Error> {
    let mut event = Map::new();
    event.insert(
        "@timestamp".to_owned(),
        Value::String(record.timestamp.format(TIMESTAMP_FORMAT).to_string()),
    );
    event.insert("@version".to_owned(), Value::String(EVENT_VERSION.to_owned()));
    event.insert("message".to_owned(), Value::String(record.message.clone()));
    event.insert("level".to_owned(), Value::String(record.level.to_string()));
    event.insert("logger_name".to_owned(), Value::String(record.logger.clone()));
    for (key, value) in &record.fields {
        event.insert(key.clone(), value.clone());
    }
    for (key, value) in extra {
        if !event.contains_key(key) {
            event.insert(key.clone(), value.clone());
        }
    }
    let mut payload = serde_json::to_vec(&Value::Object(event))?;
    payload.push(b'\n');
    Ok(payload)
}
