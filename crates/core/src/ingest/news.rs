use crate::config::Settings;
use crate::domain::RawArticle;
use crate::ingest::types::NewsApiResponse;
use crate::ingest::{check_status, env_or, with_retries};
use crate::time::window::DateWindow;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_PAGE_SIZE: u32 = 100;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_LANGUAGE: &str = "en";
const EVERYTHING_PATH: &str = "/v2/everything";

#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_articles(&self, query: &str, window: DateWindow) -> Result<Vec<RawArticle>>;
}

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
    language: String,
    retries: u32,
}

impl NewsApiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_news_api_key()?.to_string();
        let base_url = settings.news_api_base_url().to_string();

        let timeout_secs = env_or("NEWS_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let retries = env_or("NEWS_API_RETRIES", DEFAULT_RETRIES);
        let page_size = env_or("NEWS_API_PAGE_SIZE", DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let language = std::env::var("NEWS_API_LANGUAGE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build news api http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            page_size,
            language,
            retries,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), EVERYTHING_PATH)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        Ok(headers)
    }

    async fn fetch_once(&self, query: &str, window: DateWindow) -> Result<Vec<RawArticle>> {
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .query(&[
                ("q", query.to_string()),
                ("from", window.start.to_string()),
                ("to", window.end.to_string()),
                ("sortBy", "publishedAt".to_string()),
                ("language", self.language.clone()),
                ("pageSize", self.page_size.to_string()),
            ])
            .send()
            .await
            .context("news api request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read news api response")?;
        parse_everything_response(status, &text)
    }
}

#[async_trait::async_trait]
impl NewsProvider for NewsApiClient {
    fn provider_name(&self) -> &'static str {
        "newsapi"
    }

    async fn fetch_articles(&self, query: &str, window: DateWindow) -> Result<Vec<RawArticle>> {
        let articles = with_retries(self.provider_name(), self.retries, || {
            self.fetch_once(query, window)
        })
        .await?;

        tracing::info!(
            query,
            from = %window.start,
            to = %window.end,
            articles = articles.len(),
            "fetched news articles"
        );
        Ok(articles)
    }
}

fn parse_everything_response(status: StatusCode, text: &str) -> Result<Vec<RawArticle>> {
    check_status("newsapi", status, text)?;
    let parsed = serde_json::from_str::<NewsApiResponse>(text)
        .with_context(|| format!("news api HTTP {status}: response is not valid JSON: {text}"))?;

    if parsed.status != "ok" || !status.is_success() {
        anyhow::bail!(
            "news api HTTP {status}: {} ({})",
            parsed.message.as_deref().unwrap_or("no message"),
            parsed.code.as_deref().unwrap_or("no code"),
        );
    }

    Ok(parsed.articles.into_iter().map(RawArticle::from).collect())
}
