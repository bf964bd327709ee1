//! Operator-facing activity log.
//!
//! Entries are appended in order, capped at a fixed capacity, mirrored to
//! `tracing`, and handed to an optional sink so a front end can render them
//! as they happen.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Default capacity, matching the activity panel's line limit.
pub const DEFAULT_LOG_CAPACITY: usize = 999;

/// Severity of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "ℹ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠",
            LogLevel::Error => "✗",
            LogLevel::Debug => "🔍",
        }
    }
}

/// One line in the activity log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.timestamp.format("%H:%M:%S"),
            self.level.prefix(),
            self.message
        )
    }
}

/// Receives entries as they are appended.
///
/// The CLI prints them; tests usually don't install one.
pub trait LogSink: Send + Sync {
    fn on_entry(&self, entry: &LogEntry);
}

/// Sink that drops every entry.
pub struct NoopSink;

impl LogSink for NoopSink {
    fn on_entry(&self, _entry: &LogEntry) {}
}

/// Bounded, append-only activity log.
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    sink: Box<dyn LogSink>,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            sink: Box::new(NoopSink),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry {
            level,
            message: message.into(),
            timestamp: Local::now(),
        };

        match level {
            LogLevel::Error => tracing::error!(target: "activity", "{}", entry.message),
            LogLevel::Warning => tracing::warn!(target: "activity", "{}", entry.message),
            LogLevel::Debug => tracing::debug!(target: "activity", "{}", entry.message),
            LogLevel::Info | LogLevel::Success => {
                tracing::info!(target: "activity", level = level.as_str(), "{}", entry.message)
            }
        }

        self.sink.on_entry(&entry);

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Debug, message);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
