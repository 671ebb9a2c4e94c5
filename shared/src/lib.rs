//! Infraq Shared Library
//!
//! This crate contains the query building, metrics client, series alignment
//! and reporting logic behind the `infraq` command-line tool.
//!
//! # Modules
//!
//! - [`models`] - Query, time-series and aligned record models
//! - [`client`] - The `MetricsClient` trait with HTTP and in-memory implementations
//! - [`align`] - Zipping per-metric series into per-timestamp records
//! - [`report`] - Rendering aligned records as log lines or JSON
//! - [`config`] - Client configuration loaded from the environment
//!
//! # Example
//!
//! ```
//! use shared::client::InMemoryMetricsClient;
//! use shared::models::{build_query, HostMetricsResult, MetricsResponse, Rollup, TimeSeriesPoint};
//!
//! # tokio_test::block_on(async {
//! let query = build_query("entity.zone:us-east-2", ["cpu.user"], 3_600_000, Rollup::OneMinute)?;
//! let host = HostMetricsResult::new("host-1", "snap-1")
//!     .with_series("cpu.user", vec![TimeSeriesPoint::new(1_705_314_600_000, 0.42)]);
//! let client = InMemoryMetricsClient::new(MetricsResponse::new(vec![host]));
//!
//! let report = shared::run(&client, &query).await?;
//! assert_eq!(report.record_count(), 1);
//! # Ok::<(), shared::Error>(())
//! # }).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod align;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod runner;

pub use error::Error;
pub use runner::run;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde_json;
