//! JSON shapes exchanged with the infrastructure metrics endpoint.

use crate::models::{HostMetricsResult, MetricQuery, Rollup, TimeSeriesPoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Host id used when an item carries neither a host nor a label.
const UNKNOWN_HOST: &str = "unknown";

/// Relative time frame; the window always ends now.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimeFrame {
    pub window_size: u64,
}

/// Request body for a combined metrics query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CombinedMetricsRequest<'a> {
    pub time_frame: TimeFrame,
    pub rollup: Rollup,
    pub query: &'a str,
    pub plugin: &'a str,
    pub metrics: &'a [String],
}

impl<'a> From<&'a MetricQuery> for CombinedMetricsRequest<'a> {
    fn from(query: &'a MetricQuery) -> Self {
        Self {
            time_frame: TimeFrame {
                window_size: query.window_size_ms,
            },
            rollup: query.rollup,
            query: &query.filter,
            plugin: &query.plugin,
            metrics: &query.metrics,
        }
    }
}

/// Response body of the metrics endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct MetricsBody {
    #[serde(default)]
    pub items: Vec<MetricsItem>,
}

/// One matched entity with its metric series as `[timestamp, value]` pairs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetricsItem {
    #[serde(default)]
    pub snapshot_id: String,
    pub host: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub metrics: HashMap<String, Vec<(f64, f64)>>,
}

impl From<MetricsItem> for HostMetricsResult {
    fn from(item: MetricsItem) -> Self {
        let host_id = item
            .host
            .filter(|h| !h.is_empty())
            .or(item.label.filter(|l| !l.is_empty()))
            .unwrap_or_else(|| UNKNOWN_HOST.to_string());

        #[allow(clippy::cast_possible_truncation)]
        let series_by_metric = item
            .metrics
            .into_iter()
            .map(|(name, pairs)| {
                let points = pairs
                    .into_iter()
                    .map(|(ts, value)| TimeSeriesPoint::new(ts.round() as i64, value))
                    .collect();
                (name, points)
            })
            .collect();

        Self {
            host_id,
            snapshot_id: item.snapshot_id,
            series_by_metric,
        }
    }
}

/// Structured error body returned on non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Returns a human-readable detail, or `None` if the body carried nothing.
    pub fn detail(&self) -> Option<String> {
        if !self.errors.is_empty() {
            return Some(self.errors.join("; "));
        }
        self.message.clone().filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::build_query;

    #[test]
    fn test_request_body_shape() {
        let query = build_query(
            "entity.zone:us-east-2",
            ["cpu.used", "memory.used"],
            3_600_000,
            Rollup::FiveMinutes,
        )
        .unwrap();

        let json = serde_json::to_value(CombinedMetricsRequest::from(&query)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "timeFrame": { "windowSize": 3_600_000 },
                "rollup": 300,
                "query": "entity.zone:us-east-2",
                "plugin": "host",
                "metrics": ["cpu.used", "memory.used"]
            })
        );
    }

    #[test]
    fn test_item_conversion() {
        let json = r#"{
            "snapshotId": "snap-1",
            "plugin": "host",
            "from": 1705311000000,
            "to": 1705314600000,
            "tags": ["prod"],
            "label": "ip-10-0-0-1",
            "host": "host-1",
            "metrics": {
                "cpu.used": [[1705314600000, 0.25], [1705314900000, 0.5]]
            }
        }"#;

        let item: MetricsItem = serde_json::from_str(json).unwrap();
        let result = HostMetricsResult::from(item);

        assert_eq!(result.host_id, "host-1");
        assert_eq!(result.snapshot_id, "snap-1");
        assert_eq!(
            result.series("cpu.used"),
            &[
                TimeSeriesPoint::new(1_705_314_600_000, 0.25),
                TimeSeriesPoint::new(1_705_314_900_000, 0.5),
            ]
        );
    }

    #[test]
    fn test_item_host_fallback() {
        let item: MetricsItem =
            serde_json::from_str(r#"{"snapshotId": "s", "label": "web-1"}"#).unwrap();
        assert_eq!(HostMetricsResult::from(item).host_id, "web-1");

        let item: MetricsItem = serde_json::from_str(r#"{"snapshotId": "s", "host": ""}"#).unwrap();
        assert_eq!(HostMetricsResult::from(item).host_id, UNKNOWN_HOST);
    }

    #[test]
    fn test_error_body_detail() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"errors": ["Invalid token", "Forbidden"]}"#).unwrap();
        assert_eq!(body.detail().as_deref(), Some("Invalid token; Forbidden"));

        let body: ApiErrorBody = serde_json::from_str(r#"{"message": "Too many requests"}"#).unwrap();
        assert_eq!(body.detail().as_deref(), Some("Too many requests"));

        assert!(ApiErrorBody::default().detail().is_none());
    }
}
