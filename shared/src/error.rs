//! Top-level error type.

use crate::client::ClientError;
use crate::config::ConfigError;
use crate::models::QueryError;
use crate::report::ReportError;
use thiserror::Error;

/// Any fatal failure of a query invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The query violates its constraints.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The metrics request failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The response could not be reported.
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl Error {
    /// Returns true if the query matched no hosts.
    #[must_use]
    pub fn is_no_metrics_found(&self) -> bool {
        matches!(self, Self::Report(ReportError::NoMetricsFound))
    }
}
