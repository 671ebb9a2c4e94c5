//! Aligned per-timestamp record.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// One row of samples sharing a timestamp, across every requested metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRecord {
    /// Timestamp taken from the primary metric's series.
    pub timestamp: DateTime<Utc>,
    /// Host identity.
    pub host_id: String,
    /// Identifier of the monitored entity instance.
    pub snapshot_id: String,
    /// Values keyed by metric name, in query order.
    pub values: IndexMap<String, f64>,
}

impl AlignedRecord {
    /// Returns the timestamp as milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Returns the value recorded for a metric.
    #[must_use]
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }

    /// Formats the record as a single human-readable line.
    ///
    /// ```text
    /// Time: 2024-01-15T10:30:00.000Z, cpu.used: 12.5, memory.used: 40.25
    /// ```
    #[must_use]
    pub fn display_line(&self) -> String {
        let mut line = format!(
            "Time: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        for (metric, value) in &self.values {
            line.push_str(&format!(", {metric}: {value}"));
        }
        line
    }
}
