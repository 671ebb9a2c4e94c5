//! Query execution.
//!
//! Runs one query end to end: validate, fetch, align every host, build the
//! report. A single attempt is made; nothing is retried.

use crate::align::align;
use crate::client::MetricsClient;
use crate::error::Error;
use crate::models::MetricQuery;
use crate::report::Report;

/// Executes `query` against `client` and returns the aligned report.
///
/// # Errors
///
/// Returns an error if:
/// - The query is invalid
/// - The metrics request fails
/// - The response contains no hosts
pub async fn run<C: MetricsClient>(client: &C, query: &MetricQuery) -> Result<Report, Error> {
    query.validate_query()?;

    tracing::info!(
        filter = %query.filter,
        plugin = %query.plugin,
        metrics = ?query.metrics,
        window_size_ms = query.window_size_ms,
        rollup = %query.rollup,
        "Querying infrastructure metrics"
    );

    let response = client.fetch_metrics(query).await?;
    tracing::debug!(hosts = response.items.len(), "Metrics fetched");

    let aligned = response
        .items
        .iter()
        .map(|item| align(item, &query.metrics))
        .collect();

    let report = Report::build(&response, aligned)?;
    tracing::info!(
        hosts = report.hosts.len(),
        records = report.record_count(),
        alignment_errors = report.error_count(),
        "Metrics aligned"
    );

    Ok(report)
}
