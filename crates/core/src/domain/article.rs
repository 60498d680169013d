use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Article record as handed over by a news collaborator, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub description: Option<String>,
    pub source_name: String,
    /// ISO-8601 text in whatever timezone the provider uses.
    pub published_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub title: String,
    pub description: Option<String>,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub published_date: NaiveDate,
    pub sentiment: f64,
}

impl ScoredArticle {
    /// Date as shown in the article listing (`YYYY/MM/DD`).
    pub fn listing_date(&self) -> String {
        self.published_date.format("%Y/%m/%d").to_string()
    }
}

/// An article whose publication timestamp could not be turned into a calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedArticle {
    pub title: String,
    pub published_at: String,
    pub reason: String,
}

impl fmt::Display for MalformedArticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed article (title={:?}, published_at={:?}): {}",
            self.title, self.published_at, self.reason
        )
    }
}

impl std::error::Error for MalformedArticle {}
