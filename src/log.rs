//! Log sinks for outgoing operations and incoming messages.
//!
//! The [`MockTransport`](crate::transport::MockTransport) reports every call
//! to a [`LogSink`] as an `(operation, payload)` pair. Plain strings and
//! structured payloads stay distinct all the way to the sink so tests can
//! assert on shape, not only on presence.
//!
//! | Sink | Behavior |
//! |------|----------|
//! | [`RecordingSink`] | Keeps raw `(operation, payload)` records |
//! | [`EventLog`] | Timestamped, formatted, newest-first panel feed |
//! | [`TracingSink`] | Forwards to `tracing` |
//! | any `Fn(&str, LogPayload)` | Closure sink |

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::protocol::Descriptor;

// ============================================================================
// Constants
// ============================================================================

/// Default number of entries retained by an [`EventLog`].
const DEFAULT_LOG_CAPACITY: usize = 500;

// ============================================================================
// LogPayload
// ============================================================================

/// Payload handed to a [`LogSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum LogPayload {
    /// Plain text.
    Text(String),

    /// Structured JSON payload.
    Structured(Value),
}

impl LogPayload {
    /// Creates a text payload.
    #[inline]
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns `true` for structured payloads.
    #[inline]
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Returns the text, if this is a text payload.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    /// Returns the JSON value, if this is a structured payload.
    #[inline]
    #[must_use]
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Renders for display: text as-is, structures as indented JSON.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl fmt::Display for LogPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&Descriptor> for LogPayload {
    fn from(descriptor: &Descriptor) -> Self {
        match descriptor.to_value() {
            Value::String(text) => Self::Text(text),
            value => Self::Structured(value),
        }
    }
}

impl From<Value> for LogPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            value => Self::Structured(value),
        }
    }
}

impl From<&str> for LogPayload {
    #[inline]
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for LogPayload {
    #[inline]
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

// ============================================================================
// LogSink
// ============================================================================

/// Receives `(operation, payload)` pairs.
pub trait LogSink: Send + Sync {
    /// Records one operation.
    fn log(&self, operation: &str, payload: LogPayload);
}

impl<F> LogSink for F
where
    F: Fn(&str, LogPayload) + Send + Sync,
{
    fn log(&self, operation: &str, payload: LogPayload) {
        self(operation, payload)
    }
}

// ============================================================================
// RecordingSink
// ============================================================================

/// One `(operation, payload)` pair captured by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Operation name (e.g. `emitUIInteraction`).
    pub operation: String,
    /// Payload as reported.
    pub payload: LogPayload,
}

/// Sink that keeps every record in call order.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Returns the records for one operation, oldest first.
    #[must_use]
    pub fn records_for(&self, operation: &str) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.operation == operation)
            .cloned()
            .collect()
    }

    /// Returns the most recent record.
    #[must_use]
    pub fn last(&self) -> Option<LogRecord> {
        self.records.lock().last().cloned()
    }

    /// Returns the number of records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, operation: &str, payload: LogPayload) {
        self.records.lock().push(LogRecord {
            operation: operation.to_string(),
            payload,
        });
    }
}

// ============================================================================
// TracingSink
// ============================================================================

/// Sink that forwards records to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, operation: &str, payload: LogPayload) {
        debug!(operation, structured = payload.is_structured(), payload = %payload, "Transport operation");
    }
}

// ============================================================================
// EventLog
// ============================================================================

/// A formatted log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Local time the entry was recorded.
    pub timestamp: DateTime<Local>,
    /// Entry kind (`System`, `Error`, an operation name, …).
    pub kind: String,
    /// Rendered message.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}]: {}",
            self.timestamp.format("%H:%M:%S"),
            self.kind,
            self.message
        )
    }
}

/// Bounded, newest-first feed for a log panel.
///
/// Clones share the same storage.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// Creates a log with the default capacity.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log that keeps at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(64)))),
            capacity,
        }
    }

    /// Records an entry at the front, evicting the oldest when full.
    pub fn record(&self, kind: impl Into<String>, payload: impl Into<LogPayload>) {
        let entry = LogEntry {
            timestamp: Local::now(),
            kind: kind.into(),
            message: payload.into().render(),
        };

        let mut entries = self.entries.lock();
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Returns entries, newest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Returns formatted lines, newest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(ToString::to_string).collect()
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if the log is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for EventLog {
    fn log(&self, operation: &str, payload: LogPayload) {
        self.record(operation, payload);
    }
}

// ============================================================================
// Tests
// ============================================================================
