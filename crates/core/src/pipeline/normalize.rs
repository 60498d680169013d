use crate::domain::{MalformedArticle, RawArticle, ScoredArticle};
use crate::sentiment::SentimentScorer;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Scores raw articles and pins each one to a UTC calendar date.
#[derive(Debug, Clone, Copy)]
pub struct ArticleNormalizer<'a> {
    scorer: SentimentScorer<'a>,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Ascending by publication instant; equal instants keep input order.
    pub articles: Vec<ScoredArticle>,
    pub malformed: Vec<MalformedArticle>,
}

impl ArticleNormalizer<'static> {
    pub fn builtin() -> Self {
        Self::new(SentimentScorer::builtin())
    }
}

impl<'a> ArticleNormalizer<'a> {
    pub fn new(scorer: SentimentScorer<'a>) -> Self {
        Self { scorer }
    }

    pub fn normalize(&self, raw: &RawArticle) -> Result<ScoredArticle, MalformedArticle> {
        let published_at =
            parse_published_at(&raw.published_at).map_err(|reason| MalformedArticle {
                title: raw.title.clone(),
                published_at: raw.published_at.clone(),
                reason,
            })?;

        let title = raw.title.trim().to_string();
        let description = raw
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let sentiment = match &description {
            Some(desc) => self.scorer.score(&format!("{title} {desc}")),
            None => self.scorer.score(&title),
        };

        Ok(ScoredArticle {
            title,
            description,
            source: raw.source_name.trim().to_string(),
            published_date: published_at.date_naive(),
            published_at,
            sentiment,
        })
    }

    pub fn normalize_all(&self, raws: &[RawArticle]) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();
        for raw in raws {
            match self.normalize(raw) {
                Ok(article) => batch.articles.push(article),
                Err(err) => batch.malformed.push(err),
            }
        }
        batch.articles.sort_by_key(|a| a.published_at);
        batch
    }
}

/// Parses a provider timestamp into a UTC instant.
///
/// Offsets are honoured and converted to UTC; timestamps without an offset and
/// bare dates are taken to be UTC already. The host timezone is never consulted.
pub fn parse_published_at(text: &str) -> Result<DateTime<Utc>, String> {
    let s = text.trim();
    if s.is_empty() {
        return Err("missing publication timestamp".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(format!("unrecognized timestamp format: {s}"))
}
