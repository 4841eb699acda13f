use crate::model::Platform;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => f.write_str("info"),
            LogLevel::Warning => f.write_str("warning"),
            LogLevel::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// A parameter that a human should look at after conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub entity_id: String,
    pub entity_name: String,
    /// Dotted/indexed path inside the entity's parameters. Empty for whole-entity entries.
    pub path: String,
    pub reason: String,
}

/// Summary counters attached to every conversion result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub source_platform: Option<Platform>,
    pub target_platform: Option<Platform>,
    pub source_entity_count: usize,
    pub converted_entity_count: usize,
    pub mapped_count: usize,
    pub unmapped_count: usize,
    /// Per-entity detail, present only when the `debug` option is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Accumulates everything a conversion reports while it runs.
///
/// Each entry is also forwarded to `tracing` so a host-installed subscriber
/// sees the same stream the result carries.
#[derive(Debug, Default)]
pub struct Diagnostics {
    logs: Vec<LogEntry>,
    review: Vec<ReviewEntry>,
    unmapped: Vec<String>,
    mapped_count: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "flowbridge", "{}", message);
        self.push(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "flowbridge", "{}", message);
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(target: "flowbridge", "{}", message);
        self.push(LogLevel::Error, message);
    }

    fn push(&mut self, level: LogLevel, message: String) {
        self.logs.push(LogEntry { level, message });
    }

    pub fn flag(
        &mut self,
        entity_id: &str,
        entity_name: &str,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) {
        let entry = ReviewEntry {
            entity_id: entity_id.to_string(),
            entity_name: entity_name.to_string(),
            path: path.into(),
            reason: reason.into(),
        };
        tracing::debug!(
            target: "flowbridge",
            entity = %entry.entity_name,
            path = %entry.path,
            "flagged for review: {}",
            entry.reason
        );
        self.review.push(entry);
    }

    pub fn record_mapped(&mut self) {
        self.mapped_count += 1;
    }

    pub fn record_unmapped(&mut self, entity_id: &str) {
        self.unmapped.push(entity_id.to_string());
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn review(&self) -> &[ReviewEntry] {
        &self.review
    }

    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    pub fn mapped_count(&self) -> usize {
        self.mapped_count
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.logs.iter().filter(|l| l.level == level).count()
    }

    /// Moves another collector's entries into this one, preserving order.
    pub fn absorb(&mut self, other: Diagnostics) {
        self.logs.extend(other.logs);
        self.review.extend(other.review);
        self.unmapped.extend(other.unmapped);
        self.mapped_count += other.mapped_count;
    }

    pub fn into_parts(self) -> (Vec<LogEntry>, Vec<ReviewEntry>, Vec<String>, usize) {
        (self.logs, self.review, self.unmapped, self.mapped_count)
    }
}
