//! Report rendering.
//!
//! Turns a metrics response and its per-host alignments into log lines, or
//! into a JSON document for machine consumption.

use crate::align::{Alignment, AlignmentError};
use crate::models::{AlignedRecord, MetricsResponse};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The query matched no hosts.
    #[error("No metrics found")]
    NoMetricsFound,
}

/// Aligned samples for one host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostReport {
    /// Host identity.
    pub host_id: String,
    /// Identifier of the monitored entity instance.
    pub snapshot_id: String,
    /// Aligned records, in time order as returned.
    pub records: Vec<AlignedRecord>,
    /// Alignment problems found for this host.
    pub errors: Vec<AlignmentError>,
}

/// Everything printed for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Remaining request budget reported by the API.
    pub rate_limit_remaining: Option<String>,
    /// One entry per matched host, in response order.
    pub hosts: Vec<HostReport>,
}

impl Report {
    /// Builds a report from a response and the alignment of each of its items.
    ///
    /// `aligned[i]` must be the alignment of `response.items[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::NoMetricsFound`] if the response has no items.
    pub fn build(response: &MetricsResponse, aligned: Vec<Alignment>) -> Result<Self, ReportError> {
        if response.is_empty() {
            return Err(ReportError::NoMetricsFound);
        }
        debug_assert_eq!(response.items.len(), aligned.len());

        let hosts = response
            .items
            .iter()
            .zip(aligned)
            .map(|(item, alignment)| HostReport {
                host_id: item.host_id.clone(),
                snapshot_id: item.snapshot_id.clone(),
                records: alignment.records,
                errors: alignment.errors,
            })
            .collect();

        Ok(Self {
            rate_limit_remaining: response.rate_limit_remaining.clone(),
            hosts,
        })
    }

    /// Total number of records across all hosts.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.hosts.iter().map(|h| h.records.len()).sum()
    }

    /// Total number of alignment errors across all hosts.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.hosts.iter().map(|h| h.errors.len()).sum()
    }

    /// Renders the human-readable report, one entry per line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Rate Limit Remaining: {}",
            self.rate_limit_remaining.as_deref().unwrap_or("unknown")
        )];

        for host in &self.hosts {
            lines.push(format!("Host: {}", host.host_id));
            lines.push(format!("SnapshotId: {}", host.snapshot_id));
            lines.extend(host.records.iter().map(AlignedRecord::display_line));
        }

        lines
    }

    /// Emits the report through `tracing`.
    ///
    /// Records are logged at info level; alignment errors at warn level.
    pub fn log(&self) {
        tracing::info!(
            "Rate Limit Remaining: {}",
            self.rate_limit_remaining.as_deref().unwrap_or("unknown")
        );

        for host in &self.hosts {
            tracing::info!(host = %host.host_id, "Host: {}", host.host_id);
            tracing::info!(host = %host.host_id, "SnapshotId: {}", host.snapshot_id);
            for record in &host.records {
                tracing::info!(host = %host.host_id, "{}", record.display_line());
            }
        }

        self.log_warnings();
    }

    /// Emits only the alignment errors through `tracing`.
    pub fn log_warnings(&self) {
        for host in &self.hosts {
            for error in &host.errors {
                tracing::warn!(
                    host = %host.host_id,
                    snapshot_id = %host.snapshot_id,
                    "Series misalignment: {error}"
                );
            }
        }
    }

    /// Renders the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align;
    use crate::models::{HostMetricsResult, TimeSeriesPoint};

    fn metrics() -> Vec<String> {
        vec!["cpu.used".to_string(), "memory.used".to_string()]
    }

    fn response() -> MetricsResponse {
        let host = HostMetricsResult::new("host-1", "snap-1")
            .with_series(
                "cpu.used",
                vec![
                    TimeSeriesPoint::new(1_705_314_600_000, 0.5),
                    TimeSeriesPoint::new(1_705_314_900_000, 0.75),
                ],
            )
            .with_series(
                "memory.used",
                vec![
                    TimeSeriesPoint::new(1_705_314_600_000, 0.25),
                    TimeSeriesPoint::new(1_705_314_900_001, 0.5),
                ],
            );
        MetricsResponse::new(vec![host]).with_rate_limit_remaining("4999")
    }

    fn build(response: &MetricsResponse) -> Result<Report, ReportError> {
        let aligned = response.items.iter().map(|i| align(i, &metrics())).collect();
        Report::build(response, aligned)
    }

    #[test]
    fn test_empty_response_is_fatal() {
        let result = build(&MetricsResponse::default());
        assert!(matches!(result, Err(ReportError::NoMetricsFound)));
    }

    #[test]
    fn test_report_lines() {
        let report = build(&response()).unwrap();

        assert_eq!(
            report.lines(),
            vec![
                "Rate Limit Remaining: 4999",
                "Host: host-1",
                "SnapshotId: snap-1",
                "Time: 2024-01-15T10:30:00.000Z, cpu.used: 0.5, memory.used: 0.25",
                "Time: 2024-01-15T10:35:00.000Z, cpu.used: 0.75, memory.used: 0.5",
            ]
        );
    }

    #[test]
    fn test_report_counts() {
        let report = build(&response()).unwrap();

        assert_eq!(report.record_count(), 2);
        assert_eq!(report.error_count(), 1);
        assert!(matches!(
            report.hosts[0].errors[0],
            AlignmentError::TimestampMismatch { index: 1, .. }
        ));
    }

    #[test]
    fn test_unknown_rate_limit() {
        let mut response = response();
        response.rate_limit_remaining = None;
        let report = build(&response).unwrap();

        assert_eq!(report.lines()[0], "Rate Limit Remaining: unknown");
    }

    #[test]
    fn test_host_without_records_still_listed() {
        let response = MetricsResponse::new(vec![HostMetricsResult::new("idle", "snap-2")]);
        let report = build(&response).unwrap();

        assert_eq!(report.record_count(), 0);
        assert_eq!(&report.lines()[1..], ["Host: idle", "SnapshotId: snap-2"]);
    }

    #[test]
    fn test_report_json() {
        let report = build(&response()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["rate_limit_remaining"], "4999");
        assert_eq!(json["hosts"][0]["host_id"], "host-1");
        assert_eq!(json["hosts"][0]["records"][0]["values"]["cpu.used"], 0.5);
        assert_eq!(json["hosts"][0]["errors"][0]["kind"], "timestamp_mismatch");
    }
}
