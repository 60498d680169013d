pub mod news;
pub mod prices;
pub mod types;

pub use news::{NewsApiClient, NewsProvider};
pub use prices::{PriceProvider, YahooChartClient};

use anyhow::Result;
use reqwest::StatusCode;
use std::fmt;
use std::future::Future;
use std::time::Duration;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Provider answered with 429 or a server error; the request may succeed later.
#[derive(Debug)]
struct RetryableStatus {
    provider: &'static str,
    status: StatusCode,
    body: String,
}

impl fmt::Display for RetryableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} HTTP {}: {}", self.provider, self.status, self.body)
    }
}

impl std::error::Error for RetryableStatus {}

fn check_status(provider: &'static str, status: StatusCode, body: &str) -> Result<()> {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(RetryableStatus {
            provider,
            status,
            body: body.to_string(),
        }
        .into());
    }
    Ok(())
}

// Transport failures and throttling/server statuses are retried; anything else
// (auth, bad request, unknown symbol, unparseable body) fails on the first attempt.
fn is_retryable(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.is::<RetryableStatus>()
            || cause
                .downcast_ref::<reqwest::Error>()
                .is_some_and(|e| !e.is_builder())
    })
}

/// Runs `op` up to `retries` times, sleeping 1s, 2s, 4s... between attempts
/// that failed with a retryable error.
async fn with_retries<T, F, Fut>(provider: &'static str, retries: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= retries.max(1) || !is_retryable(&err) {
                    return Err(err);
                }
                let backoff = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::warn!(provider, attempt, ?backoff, error = %err, "fetch failed; retrying");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
