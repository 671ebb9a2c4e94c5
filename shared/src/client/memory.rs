//! In-memory implementation of [`MetricsClient`] serving a fixed response.

use super::{ClientError, MetricsClient};
use crate::models::{MetricQuery, MetricsResponse};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
enum Outcome {
    Response(MetricsResponse),
    ApiError { status: u16, detail: String },
}

/// Metrics client returning a canned outcome, for fixtures and testing.
///
/// Every query it receives is recorded and can be inspected with
/// [`InMemoryMetricsClient::requests`].
#[derive(Debug, Clone)]
pub struct InMemoryMetricsClient {
    outcome: Outcome,
    requests: Arc<RwLock<Vec<MetricQuery>>>,
}

impl InMemoryMetricsClient {
    /// Creates a client that always returns `response`.
    #[must_use]
    pub fn new(response: MetricsResponse) -> Self {
        Self {
            outcome: Outcome::Response(response),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates a client that always fails with an API error.
    #[must_use]
    pub fn with_api_error(status: u16, detail: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::ApiError {
                status,
                detail: detail.into(),
            },
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Returns the queries received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<MetricQuery> {
        self.requests
            .read()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl MetricsClient for InMemoryMetricsClient {
    async fn fetch_metrics(&self, query: &MetricQuery) -> Result<MetricsResponse, ClientError> {
        if let Ok(mut requests) = self.requests.write() {
            requests.push(query.clone());
        }

        match &self.outcome {
            Outcome::Response(response) => Ok(response.clone()),
            Outcome::ApiError { status, detail } => Err(ClientError::Api {
                status: *status,
                detail: detail.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{build_query, HostMetricsResult, Rollup};

    fn query() -> MetricQuery {
        build_query("entity.zone:a", ["cpu.used"], 60_000, Rollup::OneSecond).unwrap()
    }

    #[tokio::test]
    async fn test_returns_response_and_records_query() {
        let response = MetricsResponse::new(vec![HostMetricsResult::new("h", "s")]);
        let client = InMemoryMetricsClient::new(response.clone());

        let fetched = client.fetch_metrics(&query()).await.unwrap();

        assert_eq!(fetched, response);
        assert_eq!(client.requests(), vec![query()]);
    }

    #[tokio::test]
    async fn test_api_error() {
        let client = InMemoryMetricsClient::with_api_error(403, "Forbidden");

        let result = client.fetch_metrics(&query()).await;

        assert!(matches!(
            result,
            Err(ClientError::Api { status: 403, ref detail }) if detail == "Forbidden"
        ));
    }
}
