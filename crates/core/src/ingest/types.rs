use crate::domain::RawArticle;
use serde::{Deserialize, Serialize};

const UNKNOWN_SOURCE: &str = "Unknown Source";

/// `/v2/everything` response body. Error bodies share the envelope with `status = "error"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub source: Option<NewsApiSource>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsApiSource {
    pub name: Option<String>,
}

impl From<NewsApiArticle> for RawArticle {
    fn from(a: NewsApiArticle) -> Self {
        let source_name = a
            .source
            .and_then(|s| s.name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        RawArticle {
            title: a.title.unwrap_or_default(),
            description: a.description,
            source_name,
            // Left empty so the normalizer reports it as malformed.
            published_at: a.published_at.unwrap_or_default(),
        }
    }
}

/// Yahoo Finance v8 chart response, reduced to what daily closes need.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    pub meta: Option<ChartMeta>,
    pub timestamp: Option<Vec<i64>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    pub gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}
