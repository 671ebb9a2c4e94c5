//! HTTP implementation of [`MetricsClient`].

use super::wire::{ApiErrorBody, CombinedMetricsRequest, MetricsBody};
use super::{ClientError, MetricsClient};
use crate::config::Config;
use crate::models::{MetricQuery, MetricsResponse};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;

/// Path of the infrastructure metrics endpoint, relative to the API base URL.
pub const METRICS_PATH: &str = "api/infrastructure-monitoring/metrics";

/// Response header carrying the remaining request budget.
pub const RATE_LIMIT_HEADER: &str = "x-ratelimit-remaining";

/// Scheme prefix of the authorization header value.
const AUTH_SCHEME: &str = "apiToken";

/// Longest raw body excerpt kept in an API error detail.
const MAX_DETAIL_LEN: usize = 512;

/// Metrics client talking to the monitoring API over HTTPS.
#[derive(Clone)]
pub struct HttpMetricsClient {
    endpoint: String,
    api_token: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpMetricsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetricsClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpMetricsClient {
    /// Creates a client for the API described by `config`.
    ///
    /// The request timeout and TLS verification toggle come from the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        if config.insecure {
            tracing::warn!("TLS certificate verification is disabled");
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            endpoint: format!(
                "{}/{METRICS_PATH}",
                config.api_url.as_str().trim_end_matches('/')
            ),
            api_token: config.api_token.clone(),
            client,
        })
    }

    /// Returns the full URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, source: reqwest::Error) -> ClientError {
        ClientError::Transport {
            url: self.endpoint.clone(),
            source,
        }
    }
}

impl MetricsClient for HttpMetricsClient {
    async fn fetch_metrics(&self, query: &MetricQuery) -> Result<MetricsResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, "Sending metrics request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("{AUTH_SCHEME} {}", self.api_token))
            .json(&CombinedMetricsRequest::from(query))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let rate_limit_remaining = response
            .headers()
            .get(RATE_LIMIT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail: error_detail(status, &body),
            });
        }

        let body: MetricsBody = serde_json::from_str(&body)?;
        tracing::debug!(items = body.items.len(), "Decoded metrics response");

        Ok(MetricsResponse {
            items: body.items.into_iter().map(Into::into).collect(),
            rate_limit_remaining,
        })
    }
}

/// Extracts the most useful error detail from a failed response body.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Some(detail) = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.detail())
    {
        return detail;
    }

    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no error detail")
            .to_string();
    }

    match body.char_indices().nth(MAX_DETAIL_LEN) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
