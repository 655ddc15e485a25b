//! Benchmark: many clients hand requests to one dispatcher and wait on the
//! returned futures.

use anyhow::{Context, Result};
use clap::Parser;
use promise_pair::service::{self, ClientStats, ServiceConfig};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "async_service", about = "Promise/future hand-off benchmark")]
struct Args {
    /// Number of concurrent clients.
    #[arg(long, default_value_t = 10)]
    clients: usize,
    /// Simulated service latency per request, in microseconds.
    #[arg(long, default_value_t = 1)]
    latency_us: u64,
    /// Bounded wait before falling back to a blocking get, in microseconds.
    #[arg(long, default_value_t = 0)]
    timeout_us: u64,
    /// Requests between two samples.
    #[arg(long, default_value_t = 1000)]
    report_every: u64,
    /// How long to run.
    #[arg(long, default_value_t = 5)]
    duration_secs: u64,
}

impl Args {
    fn config(&self) -> ServiceConfig {
        ServiceConfig {
            service_latency: Duration::from_micros(self.latency_us),
            try_get_timeout: Duration::from_micros(self.timeout_us),
            report_every: self.report_every.max(1),
            ..ServiceConfig::default().with_clients(self.clients)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.config();
    tracing::info!(?config, "starting benchmark");

    let stats = service::run(&config, Duration::from_secs(args.duration_secs))
        .context("benchmark failed")?;
    let mut total = ClientStats::default();
    for client in &stats {
        total.merge(client);
    }
    tracing::info!(
        requests = total.requests,
        timeouts = total.timeouts,
        mean_latency = ?total.mean_latency(),
        elapsed = ?total.elapsed,
        "benchmark done"
    );
    Ok(())
}
