//! Data models for infrastructure metric queries.
//!
//! This module contains the query sent to the monitoring API, the per-host
//! series it returns, and the aligned records built from them.

pub mod query;
pub mod record;
pub mod series;

pub use query::{build_query, MetricQuery, QueryError, Rollup, DEFAULT_PLUGIN};
pub use record::AlignedRecord;
pub use series::{HostMetricsResult, MetricsResponse, TimeSeriesPoint};
