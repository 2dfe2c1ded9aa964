//! Load generator for a running listkeeper server.
//!
//! Issues `LOADTEST_REQUESTS` GET requests against `LOADTEST_URL` with
//! `LOADTEST_CONCURRENCY` requests in flight, then prints a summary.
//!
//! Run with: `cargo run --release --bin listkeeper-loadtest`

use futures::stream::{self, StreamExt};
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_URL: &str = "http://localhost:8080/get";
const DEFAULT_REQUESTS: usize = 10_000;
const DEFAULT_CONCURRENCY: usize = 50;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

struct LoadConfig {
    url: String,
    requests: usize,
    concurrency: usize,
}

impl LoadConfig {
    fn from_env() -> Self {
        Self {
            url: env::var("LOADTEST_URL").unwrap_or_else(|_| DEFAULT_URL.to_string()),
            requests: env::var("LOADTEST_REQUESTS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(DEFAULT_REQUESTS),
            concurrency: env::var("LOADTEST_CONCURRENCY")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_CONCURRENCY),
        }
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Copy)]
struct Summary {
    requests: usize,
    failures: usize,
    elapsed: Duration,
}

impl Summary {
    const fn successes(&self) -> usize {
        self.requests.saturating_sub(self.failures)
    }

    #[allow(clippy::cast_precision_loss)]
    fn rate(&self) -> f64 {
        self.requests as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }

    fn report(&self) -> String {
        format!(
            "Total requests: {}\nSuccess:        {}\nFailures:       {}\nDuration:       {:.2?}\nRequests/sec:   {:.2}",
            self.requests,
            self.successes(),
            self.failures,
            self.elapsed,
            self.rate(),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listkeeper_loadtest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = LoadConfig::from_env();
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    info!(
        url = %config.url,
        requests = config.requests,
        concurrency = config.concurrency,
        "Starting load test"
    );

    let failures = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    stream::iter(0..config.requests)
        .map(|_| {
            let client = client.clone();
            let url = config.url.clone();
            let failures = Arc::clone(&failures);
            async move {
                match client.get(&url).send().await {
                    Ok(response) if response.status() == reqwest::StatusCode::OK => {}
                    Ok(response) => {
                        debug!(status = %response.status(), "Unexpected status");
                        failures.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        debug!(error = %err, "Request failed");
                        failures.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        })
        .buffer_unordered(config.concurrency)
        .collect::<()>()
        .await;

    let summary = Summary {
        requests: config.requests,
        failures: failures.load(Ordering::Relaxed),
        elapsed: started.elapsed(),
    };
    println!("{}", summary.report());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_successes() {
        let summary = Summary {
            requests: 100,
            failures: 7,
            elapsed: Duration::from_secs(2),
        };

        let report = summary.report();

        assert_eq!(summary.successes(), 93);
        assert!(report.contains("Total requests: 100"));
        assert!(report.contains("Success:        93"));
        assert!(report.contains("Failures:       7"));
        assert!(report.contains("Requests/sec:   50.00"));
    }
}
