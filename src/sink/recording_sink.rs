//! Record storage with callbacks
//!
//! This module provides a thread-safe sink that keeps every record it
//! receives, for inspection by tests or by callers that want the raw traffic.

use super::log_sink::{format_template, Sink};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Type alias for record callback functions
pub type RecordCallback = Arc<dyn Fn(&SinkRecord) + Send + Sync>;

/// One call to [`Sink::log`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkRecord {
    pub timestamp: DateTime<Utc>,
    pub template: String,
    pub values: Vec<String>,
}

impl SinkRecord {
    pub fn new(template: &str, values: &[&str]) -> Self {
        Self {
            timestamp: Utc::now(),
            template: template.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// The template with its values substituted
    pub fn message(&self) -> String {
        let values: Vec<&str> = self.values.iter().map(String::as_str).collect();
        format_template(&self.template, &values)
    }

    /// Whether this record has the given template and values
    pub fn matches(&self, template: &str, values: &[&str]) -> bool {
        self.template == template
            && self.values.iter().map(String::as_str).eq(values.iter().copied())
    }

    pub fn printable_summary(&self) -> String {
        let time_str = self.timestamp.with_timezone(&Local).format("%H:%M:%S%.3f");
        format!("[{}] {}", time_str, self.message())
    }
}

/// Sink that stores every record it receives
///
/// RecordingSink supports:
/// - A callback triggered on each stored record
/// - Querying all records or the last N
/// - Formatted messages for quick assertions
pub struct RecordingSink {
    records: Arc<Mutex<Vec<SinkRecord>>>,
    on_record_callback: Option<RecordCallback>,
}

impl RecordingSink {
    /// Create a new recording sink
    ///
    /// # Arguments
    ///
    /// * `on_record_callback` - Optional callback function called whenever a record is stored
    pub fn new(on_record_callback: Option<RecordCallback>) -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            on_record_callback,
        }
    }

    /// Snapshot of all records, oldest first
    pub fn records(&self) -> Vec<SinkRecord> {
        self.lock().clone()
    }

    /// Formatted messages of all records, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(SinkRecord::message).collect()
    }

    /// The last `n` records
    pub fn last_n(&self, n: usize) -> Vec<SinkRecord> {
        let records = self.lock();
        let start_idx = records.len().saturating_sub(n);
        records[start_idx..].to_vec()
    }

    /// Clear all records
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SinkRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Sink for RecordingSink {
    fn log(&self, template: &str, values: &[&str]) {
        let record = SinkRecord::new(template, values);

        // Trigger callback before storing (if exists)
        if let Some(callback) = &self.on_record_callback {
            callback(&record);
        }

        self.lock().push(record);
    }
}
