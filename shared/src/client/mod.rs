//! Metrics client trait and implementations.
//!
//! This module provides the seam between the query/alignment core and the
//! remote monitoring API. The `MetricsClient` trait defines the single call
//! the core needs, allowing an HTTP implementation for real use and an
//! in-memory implementation for fixtures and tests.

pub mod http;
pub mod memory;
mod wire;

pub use http::{HttpMetricsClient, METRICS_PATH, RATE_LIMIT_HEADER};
pub use memory::InMemoryMetricsClient;

use crate::models::{MetricQuery, MetricsResponse};
use std::future::Future;
use thiserror::Error;

/// Errors that can occur while fetching metrics.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    /// The request failed before a response was received (DNS, TLS, connect, timeout).
    #[error("Transport error calling {url}")]
    Transport {
        /// The endpoint that was called.
        url: String,
        /// The underlying cause.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail decoded from the response body.
        detail: String,
    },

    /// The API answered successfully but the body could not be decoded.
    #[error("Failed to decode metrics response")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Returns true if the request ran into the client timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

/// Fetches infrastructure metrics for a query.
pub trait MetricsClient {
    /// Performs one request for `query` and returns the decoded response.
    ///
    /// Implementations make exactly one attempt; nothing is retried.
    fn fetch_metrics(
        &self,
        query: &MetricQuery,
    ) -> impl Future<Output = Result<MetricsResponse, ClientError>> + Send;
}
