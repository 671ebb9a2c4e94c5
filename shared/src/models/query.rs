//! Metric query model.
//!
//! Defines the `MetricQuery` sent to the infrastructure-monitoring API and the
//! `build_query` constructor that enforces its constraints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Plugin scope used when none is given explicitly.
pub const DEFAULT_PLUGIN: &str = "host";

/// Server-side aggregation granularity applied to raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Rollup {
    /// 1 second buckets.
    OneSecond,
    /// 5 second buckets.
    FiveSeconds,
    /// 1 minute buckets.
    OneMinute,
    /// 5 minute buckets.
    FiveMinutes,
    /// 1 hour buckets.
    OneHour,
}

impl Rollup {
    /// Every granularity the API accepts, finest first.
    pub const ALL: [Self; 5] = [
        Self::OneSecond,
        Self::FiveSeconds,
        Self::OneMinute,
        Self::FiveMinutes,
        Self::OneHour,
    ];

    /// Returns the bucket size in seconds.
    #[must_use]
    pub const fn as_secs(self) -> u32 {
        match self {
            Self::OneSecond => 1,
            Self::FiveSeconds => 5,
            Self::OneMinute => 60,
            Self::FiveMinutes => 300,
            Self::OneHour => 3600,
        }
    }

    /// Returns the bucket size as a duration.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.as_secs()))
    }
}

impl std::fmt::Display for Rollup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.as_secs())
    }
}

impl From<Rollup> for u32 {
    fn from(rollup: Rollup) -> Self {
        rollup.as_secs()
    }
}

impl TryFrom<u32> for Rollup {
    type Error = QueryError;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|rollup| rollup.as_secs() == secs)
            .ok_or(QueryError::UnsupportedRollup(secs))
    }
}

impl FromStr for Rollup {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs = s
            .trim()
            .trim_end_matches('s')
            .parse::<u32>()
            .map_err(|_| QueryError::InvalidRollup(s.to_string()))?;
        Self::try_from(secs)
    }
}

/// Errors raised when a metric query violates its constraints.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The filter expression is empty.
    #[error("Invalid query: filter expression cannot be empty")]
    EmptyFilter,

    /// No metric names were requested.
    #[error("Invalid query: at least one metric is required")]
    NoMetrics,

    /// A requested metric name is empty.
    #[error("Invalid query: metric names cannot be empty")]
    EmptyMetricName,

    /// A metric name was requested more than once.
    #[error("Invalid query: metric '{0}' is requested more than once")]
    DuplicateMetric(String),

    /// The rollup is not one of the supported granularities.
    #[error("Invalid query: unsupported rollup of {0}s (expected one of 1, 5, 60, 300, 3600)")]
    UnsupportedRollup(u32),

    /// The rollup could not be parsed as a number of seconds.
    #[error("Invalid query: cannot parse rollup '{0}'")]
    InvalidRollup(String),

    /// An absolute end time was requested; only relative windows are supported.
    #[error("Invalid query: absolute end time is not supported, the window always ends now")]
    AbsoluteEndTimeUnsupported,

    /// A field constraint failed (empty plugin, zero window).
    #[error("Invalid query: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// A time-windowed, multi-metric query against the monitoring API.
///
/// # Example
///
/// ```
/// use shared::models::{build_query, Rollup};
///
/// let query = build_query(
///     "entity.zone:us-east-2",
///     ["cpu.used", "memory.used"],
///     3_600_000,
///     Rollup::FiveMinutes,
/// )
/// .unwrap();
///
/// assert_eq!(query.primary_metric(), "cpu.used");
/// assert_eq!(query.plugin, "host");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct MetricQuery {
    /// Opaque filter expression selecting the entities to query.
    #[validate(length(min = 1, message = "Filter cannot be empty"))]
    pub filter: String,

    /// Coarse resource-type scope (e.g., "host").
    #[validate(length(min = 1, message = "Plugin cannot be empty"))]
    pub plugin: String,

    /// Metric names in request order. The first is the alignment reference.
    #[validate(length(min = 1, message = "At least one metric is required"))]
    pub metrics: Vec<String>,

    /// Size of the window ending now, in milliseconds.
    #[validate(range(min = 1, message = "Window size must be greater than zero"))]
    pub window_size_ms: u64,

    /// Sampling granularity.
    pub rollup: Rollup,

    /// Absolute end of the window. Not supported; a query carrying one fails validation.
    pub end_time: Option<DateTime<Utc>>,
}

impl MetricQuery {
    /// Sets the plugin scope.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = plugin.into();
        self
    }

    /// Sets an absolute end time for the window.
    ///
    /// The monitoring API query is always relative to now, so a query with an
    /// end time is rejected by [`MetricQuery::validate_query`].
    #[must_use]
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Returns the metric every other series is aligned against.
    ///
    /// # Panics
    ///
    /// Panics if the query has no metrics, which `validate_query` rules out.
    #[must_use]
    pub fn primary_metric(&self) -> &str {
        &self.metrics[0]
    }

    /// Returns the window size as a duration.
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_size_ms)
    }

    /// Validates the query.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The filter is empty, or the plugin is empty ([`QueryError::Validation`])
    /// - No metrics are requested, or a metric name is empty or repeated
    /// - The window size is zero ([`QueryError::Validation`])
    /// - An absolute end time is set
    pub fn validate_query(&self) -> Result<(), QueryError> {
        if self.filter.is_empty() {
            return Err(QueryError::EmptyFilter);
        }
        if self.metrics.is_empty() {
            return Err(QueryError::NoMetrics);
        }

        let mut seen = HashSet::with_capacity(self.metrics.len());
        for metric in &self.metrics {
            if metric.is_empty() {
                return Err(QueryError::EmptyMetricName);
            }
            if !seen.insert(metric.as_str()) {
                return Err(QueryError::DuplicateMetric(metric.clone()));
            }
        }

        self.validate()?;

        if self.end_time.is_some() {
            return Err(QueryError::AbsoluteEndTimeUnsupported);
        }
        Ok(())
    }
}

/// Builds a validated query for the last `window_size_ms` milliseconds.
///
/// The plugin scope defaults to [`DEFAULT_PLUGIN`].
///
/// # Errors
///
/// Returns a [`QueryError`] if any constraint checked by
/// [`MetricQuery::validate_query`] is violated.
pub fn build_query<I, S>(
    filter: impl Into<String>,
    metrics: I,
    window_size_ms: u64,
    rollup: Rollup,
) -> Result<MetricQuery, QueryError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let query = MetricQuery {
        filter: filter.into(),
        plugin: DEFAULT_PLUGIN.to_string(),
        metrics: metrics.into_iter().map(Into::into).collect(),
        window_size_ms,
        rollup,
        end_time: None,
    };
    query.validate_query()?;
    Ok(query)
}
