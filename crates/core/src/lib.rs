pub mod analysis;
pub mod domain;
pub mod ingest;
pub mod pipeline;
pub mod sentiment;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org";
    const DEFAULT_PRICE_PROVIDER_BASE_URL: &str = "https://query2.finance.yahoo.com";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub news_api_key: Option<String>,
        pub news_api_base_url: Option<String>,
        pub price_provider_base_url: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                news_api_key: non_empty_var("NEWS_API_KEY"),
                news_api_base_url: non_empty_var("NEWS_API_BASE_URL"),
                price_provider_base_url: non_empty_var("PRICE_PROVIDER_BASE_URL"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_news_api_key(&self) -> anyhow::Result<&str> {
            self.news_api_key
                .as_deref()
                .context("NEWS_API_KEY is required")
        }

        pub fn news_api_base_url(&self) -> &str {
            self.news_api_base_url
                .as_deref()
                .unwrap_or(DEFAULT_NEWS_API_BASE_URL)
        }

        pub fn price_provider_base_url(&self) -> &str {
            self.price_provider_base_url
                .as_deref()
                .unwrap_or(DEFAULT_PRICE_PROVIDER_BASE_URL)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

}
