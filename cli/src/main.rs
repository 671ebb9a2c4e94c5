//! Infraq CLI
//!
//! Queries the infrastructure-monitoring API for host metrics over a recent
//! window and prints one aligned line per timestamp.
//!
//! # Usage
//!
//! ```bash
//! export API_TOKEN=... API_URL=https://example.instana.io
//! infraq --help
//! infraq -query 'entity.zone:us-east-2'
//! infraq --metrics cpu.used,memory.used --rollup 60 --output json
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use shared::chrono::{DateTime, Utc};
use shared::client::HttpMetricsClient;
use shared::config::Config;
use shared::models::{build_query, MetricQuery, QueryError, Rollup, DEFAULT_PLUGIN};
use std::ffi::OsString;
use std::time::Duration;

/// Filter expression used when `-query` is not given.
const DEFAULT_QUERY: &str = "entity.zone:us-east-2";

/// Metrics queried when `--metrics` is not given.
const DEFAULT_METRICS: [&str; 2] = ["cpu.used", "memory.used"];

/// One hour.
const DEFAULT_WINDOW_MS: u64 = 3_600_000;


/// How the report is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable log lines on stderr
    Text,
    /// A JSON document on stdout
    Json,
}

/// Infraq - query infrastructure metrics and print aligned samples
#[derive(Debug, Parser)]
#[command(name = "infraq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Filter expression selecting the entities to query
    #[arg(long, default_value = DEFAULT_QUERY)]
    query: String,

    /// Comma-separated metric names; the first one is the alignment reference
    #[arg(long, value_delimiter = ',', default_values = DEFAULT_METRICS)]
    metrics: Vec<String>,

    /// Plugin scope of the queried entities
    #[arg(long, default_value = DEFAULT_PLUGIN)]
    plugin: String,

    /// Size of the window ending now, in milliseconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_MS)]
    window_ms: u64,

    /// Rollup in seconds (1, 5, 60, 300 or 3600)
    #[arg(long, default_value_t = Rollup::FiveMinutes)]
    rollup: Rollup,

    /// Absolute end of the window (RFC 3339); not supported yet
    #[arg(long)]
    to: Option<DateTime<Utc>>,

    /// Skip TLS certificate verification (overrides API_INSECURE)
    #[arg(long)]
    insecure: bool,

    /// Request timeout in seconds (overrides API_TIMEOUT_SECS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

impl Cli {
    /// Builds the metric query described by the flags.
    fn metric_query(&self) -> Result<MetricQuery, QueryError> {
        let mut query = build_query(self.query.clone(), self.metrics.clone(), self.window_ms, self.rollup)?
            .with_plugin(self.plugin.clone());
        if let Some(to) = self.to {
            query = query.with_end_time(to);
        }
        query.validate_query()?;
        Ok(query)
    }

    /// Applies flag overrides on top of the environment configuration.
    fn apply_overrides(&self, mut config: Config) -> Config {
        if self.insecure {
            config = config.with_insecure(true);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

/// Rewrites Go-style single-dash long flags (`-query x`, `-query=x`) to the
/// double-dash form clap expects. Only names of known long options are touched.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let command = Cli::command();
    let longs: Vec<&str> = command
        .get_arguments()
        .filter_map(clap::Arg::get_long)
        .chain(["help", "version"])
        .collect();

    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            let Some(flag) = arg.to_str().and_then(|s| s.strip_prefix('-')) else {
                return arg;
            };
            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            if !flag.starts_with('-') && longs.contains(&name) {
                OsString::from(format!("--{flag}"))
            } else {
                arg
            }
        })
        .collect()
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let api_token_set = std::env::var_os(shared::config::API_TOKEN_VAR).is_some();
    let api_url = std::env::var(shared::config::API_URL_VAR).unwrap_or_default();
    tracing::info!(api_token_set, api_url = %api_url, "Starting infraq");

    let config = Config::from_env().context("Invalid configuration")?;
    let config = cli.apply_overrides(config);
    let query = cli.metric_query()?;

    let client = HttpMetricsClient::new(&config)?;
    let report = shared::run(&client, &query)
        .await
        .context("Error in retrieving metrics")?;

    match cli.output {
        OutputFormat::Text => report.log(),
        OutputFormat::Json => {
            report.log_warnings();
            println!("{}", report.to_json()?);
        }
    }

    Ok(())
}
