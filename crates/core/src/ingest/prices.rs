//! Daily closes from Yahoo Finance's v8 chart endpoint.
//!
//! The endpoint is unofficial and changes without notice, so parsing is kept
//! in one pure function that the tests pin down.

use crate::config::Settings;
use crate::domain::DailyPrice;
use crate::ingest::types::ChartResponse;
use crate::ingest::{check_status, env_or, with_retries};
use crate::time::window::DateWindow;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime};
use reqwest::StatusCode;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[async_trait::async_trait]
pub trait PriceProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_daily_closes(&self, ticker: &str, window: DateWindow) -> Result<Vec<DailyPrice>>;
}

#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl YahooChartClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout_secs = env_or("PRICE_PROVIDER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let retries = env_or("PRICE_PROVIDER_RETRIES", DEFAULT_RETRIES);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build price provider http client")?;

        Ok(Self {
            http,
            base_url: settings.price_provider_base_url().to_string(),
            retries,
        })
    }

    fn chart_url(&self, ticker: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid PRICE_PROVIDER_BASE_URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("PRICE_PROVIDER_BASE_URL cannot hold a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);
        Ok(url)
    }

    async fn fetch_once(&self, ticker: &str, window: DateWindow) -> Result<Vec<DailyPrice>> {
        let (period1, period2) = window_bounds(window);

        let res = self
            .http
            .get(self.chart_url(ticker)?)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await
            .context("price provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read price provider response")?;
        parse_chart_response(ticker, status, &text)
    }
}

#[async_trait::async_trait]
impl PriceProvider for YahooChartClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_daily_closes(&self, ticker: &str, window: DateWindow) -> Result<Vec<DailyPrice>> {
        let prices = with_retries(self.provider_name(), self.retries, || {
            self.fetch_once(ticker, window)
        })
        .await?;

        let fetched = prices.len();
        let prices: Vec<DailyPrice> = prices
            .into_iter()
            .filter(|p| window.contains(p.date))
            .collect();
        if prices.len() != fetched {
            tracing::debug!(ticker, dropped = fetched - prices.len(), "dropped closes outside window");
        }

        tracing::info!(ticker, days = prices.len(), "fetched daily closes");
        Ok(prices)
    }
}

// Unix seconds for the window start and the midnight after its end (exclusive).
fn window_bounds(window: DateWindow) -> (i64, i64) {
    let start = window.start.and_time(NaiveTime::default()).and_utc().timestamp();
    let end = (window.end + ChronoDuration::days(1))
        .and_time(NaiveTime::default())
        .and_utc()
        .timestamp();
    (start, end)
}

fn parse_chart_response(ticker: &str, status: StatusCode, text: &str) -> Result<Vec<DailyPrice>> {
    check_status("yahoo_chart", status, text)?;
    let parsed = serde_json::from_str::<ChartResponse>(text).with_context(|| {
        format!("price provider HTTP {status}: response is not a chart payload: {text}")
    })?;

    if let Some(err) = parsed.chart.error {
        anyhow::bail!(
            "price provider error for {ticker}: {} ({})",
            err.description,
            err.code
        );
    }
    anyhow::ensure!(status.is_success(), "price provider HTTP {status} for {ticker}");

    let data = parsed
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .with_context(|| format!("price provider returned no result for {ticker}"))?;

    // Some symbols with no trades in range come back without timestamps.
    let timestamps = data.timestamp.unwrap_or_default();
    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut prices = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        let date = exchange_date(ts, offset)
            .with_context(|| format!("invalid timestamp from price provider: {ts}"))?;
        if !(close.is_finite() && close > 0.0) {
            tracing::warn!(ticker, %date, close, "skipping non-positive close");
            continue;
        }
        prices.push(DailyPrice { date, close });
    }

    Ok(prices)
}

fn exchange_date(ts: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts.checked_add(gmtoffset)?, 0).map(|dt| dt.date_naive())
}
