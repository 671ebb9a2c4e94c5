//! Time-series response model.
//!
//! A metrics response holds, per host, one independently indexed series per
//! requested metric. Nothing here assumes the series line up; see
//! [`crate::align`] for that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single sample of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// The sampled value.
    pub value: f64,
}

impl TimeSeriesPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }

    /// Converts the timestamp to calendar time.
    ///
    /// Returns `None` if the timestamp is out of the representable range.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// The metric series returned for one monitored host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostMetricsResult {
    /// Host identity.
    pub host_id: String,
    /// Identifier of the monitored entity instance.
    pub snapshot_id: String,
    /// Ordered samples keyed by metric name.
    pub series_by_metric: HashMap<String, Vec<TimeSeriesPoint>>,
}

impl HostMetricsResult {
    /// Creates a result with no series.
    #[must_use]
    pub fn new(host_id: impl Into<String>, snapshot_id: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            snapshot_id: snapshot_id.into(),
            series_by_metric: HashMap::new(),
        }
    }

    /// Adds (or replaces) the series for a metric.
    #[must_use]
    pub fn with_series(mut self, metric: impl Into<String>, points: Vec<TimeSeriesPoint>) -> Self {
        self.series_by_metric.insert(metric.into(), points);
        self
    }

    /// Returns the series for a metric, or an empty slice if none was returned.
    #[must_use]
    pub fn series(&self, metric: &str) -> &[TimeSeriesPoint] {
        self.series_by_metric
            .get(metric)
            .map_or(&[][..], Vec::as_slice)
    }
}

/// The decoded result of one metrics request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsResponse {
    /// One entry per matched host, in response order.
    pub items: Vec<HostMetricsResult>,
    /// Value of the rate-limit-remaining response header, if present.
    pub rate_limit_remaining: Option<String>,
}

impl MetricsResponse {
    /// Creates a response from its items.
    #[must_use]
    pub fn new(items: Vec<HostMetricsResult>) -> Self {
        Self {
            items,
            rate_limit_remaining: None,
        }
    }

    /// Sets the remaining rate limit.
    #[must_use]
    pub fn with_rate_limit_remaining(mut self, remaining: impl Into<String>) -> Self {
        self.rate_limit_remaining = Some(remaining.into());
        self
    }

    /// Returns true if no host matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
