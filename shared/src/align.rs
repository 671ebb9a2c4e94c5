//! Series alignment.
//!
//! The monitoring API returns one independently indexed series per metric.
//! [`align`] zips them into per-timestamp [`AlignedRecord`]s using the first
//! requested metric as the reference, and reports every place where the
//! series disagree instead of assuming they line up.

use crate::models::{AlignedRecord, HostMetricsResult, TimeSeriesPoint};
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

/// A non-fatal disagreement between the series of one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentError {
    /// A metric's timestamp differs from the primary metric's at the same index.
    /// The record is still emitted with the primary timestamp.
    #[error("Timestamp mismatch at index {index}: '{metric}' has {found}, expected {expected}")]
    TimestampMismatch {
        /// Position in the series.
        index: usize,
        /// The metric whose timestamp disagrees.
        metric: String,
        /// The primary metric's timestamp (ms).
        expected: i64,
        /// The disagreeing timestamp (ms).
        found: i64,
    },

    /// A metric has fewer points than the primary metric; output stops at the shortest series.
    #[error("Series '{metric}' has {found_len} points, expected {expected_len}; output truncated")]
    TruncatedSeries {
        /// The short metric.
        metric: String,
        /// Length of the primary series.
        expected_len: usize,
        /// Length of this metric's series.
        found_len: usize,
    },

    /// A metric has more points than the primary metric; the extra points are not emitted.
    #[error("Series '{metric}' has {found_len} points, expected {expected_len}; surplus points dropped")]
    SurplusPoints {
        /// The long metric.
        metric: String,
        /// Length of the primary series.
        expected_len: usize,
        /// Length of this metric's series.
        found_len: usize,
    },

    /// The primary timestamp cannot be represented as calendar time; the index is skipped.
    #[error("Timestamp {timestamp_ms} at index {index} is out of range")]
    InvalidTimestamp {
        /// Position in the series.
        index: usize,
        /// The raw timestamp (ms).
        timestamp_ms: i64,
    },
}

/// Output of aligning one host's series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    /// One record per aligned index.
    pub records: Vec<AlignedRecord>,
    /// Every disagreement found, in detection order.
    pub errors: Vec<AlignmentError>,
}

impl Alignment {
    /// Returns true if no alignment errors were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the timestamp mismatches only.
    pub fn mismatches(&self) -> impl Iterator<Item = &AlignmentError> {
        self.errors
            .iter()
            .filter(|e| matches!(e, AlignmentError::TimestampMismatch { .. }))
    }

    /// Returns true if any series was shorter than the primary series.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, AlignmentError::TruncatedSeries { .. }))
    }
}

/// Aligns the series of one host into per-timestamp records.
///
/// `metrics[0]` is the primary metric. Output length is the shortest series
/// length; timestamps of every other metric are compared against the primary
/// at each index. A metric missing from `result` counts as an empty series.
///
/// # Example
///
/// ```
/// use shared::align::align;
/// use shared::models::{HostMetricsResult, TimeSeriesPoint};
///
/// let result = HostMetricsResult::new("host-1", "snap-1")
///     .with_series("cpu.used", vec![TimeSeriesPoint::new(1_000, 0.5)])
///     .with_series("memory.used", vec![TimeSeriesPoint::new(1_000, 0.8)]);
/// let metrics = vec!["cpu.used".to_string(), "memory.used".to_string()];
///
/// let alignment = align(&result, &metrics);
/// assert!(alignment.is_clean());
/// assert_eq!(alignment.records[0].value("memory.used"), Some(0.8));
/// ```
#[must_use]
pub fn align(result: &HostMetricsResult, metrics: &[String]) -> Alignment {
    let Some((primary, others)) = metrics.split_first() else {
        return Alignment::default();
    };

    let primary_series = result.series(primary);
    if primary_series.is_empty() {
        return Alignment::default();
    }

    let others: Vec<(&str, &[TimeSeriesPoint])> = others
        .iter()
        .map(|metric| (metric.as_str(), result.series(metric)))
        .collect();

    let mut errors = Vec::new();
    let mut len = primary_series.len();
    for &(metric, series) in &others {
        let (expected_len, found_len) = (primary_series.len(), series.len());
        match found_len.cmp(&expected_len) {
            Ordering::Less => {
                errors.push(AlignmentError::TruncatedSeries {
                    metric: metric.to_string(),
                    expected_len,
                    found_len,
                });
                len = len.min(found_len);
            }
            Ordering::Greater => errors.push(AlignmentError::SurplusPoints {
                metric: metric.to_string(),
                expected_len,
                found_len,
            }),
            Ordering::Equal => {}
        }
    }

    let mut records = Vec::with_capacity(len);
    for (index, point) in primary_series[..len].iter().enumerate() {
        let expected = point.timestamp_ms;
        let mut values = IndexMap::with_capacity(metrics.len());
        values.insert(primary.clone(), point.value);

        for &(metric, series) in &others {
            // len is bounded by every series length above
            let other = series[index];
            if other.timestamp_ms != expected {
                errors.push(AlignmentError::TimestampMismatch {
                    index,
                    metric: metric.to_string(),
                    expected,
                    found: other.timestamp_ms,
                });
            }
            values.insert(metric.to_string(), other.value);
        }

        let Some(timestamp) = point.timestamp() else {
            errors.push(AlignmentError::InvalidTimestamp {
                index,
                timestamp_ms: expected,
            });
            continue;
        };

        records.push(AlignedRecord {
            timestamp,
            host_id: result.host_id.clone(),
            snapshot_id: result.snapshot_id.clone(),
            values,
        });
    }

    tracing::debug!(
        host = %result.host_id,
        records = records.len(),
        errors = errors.len(),
        "Aligned host series"
    );

    Alignment { records, errors }
}
