//! Pure scoring and alignment pipeline.
//!
//! raw articles -> [`ArticleNormalizer`] -> [`aggregate`] -> [`align`] against
//! the daily price series. Nothing here performs I/O; collaborators fetch the
//! inputs beforehand and render the outputs afterwards.

pub mod aggregate;
pub mod align;
pub mod normalize;
pub mod report;

pub use aggregate::aggregate;
pub use align::align;
pub use normalize::{parse_published_at, ArticleNormalizer, NormalizedBatch};
pub use report::{Metrics, Report, ReportRequest, DEFAULT_TOP_N};

use crate::domain::{AlignedPoint, DailyPrice, DailySentiment, RawArticle, ScoredArticle};
use serde::Serialize;

const MAX_LOGGED_MALFORMED: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub articles: Vec<ScoredArticle>,
    pub daily_sentiment: Vec<DailySentiment>,
    pub aligned: Vec<AlignedPoint>,
    pub skipped_malformed: usize,
}

pub fn run(raws: &[RawArticle], prices: &[DailyPrice]) -> PipelineOutput {
    run_with(&ArticleNormalizer::builtin(), raws, prices)
}

pub fn run_with(
    normalizer: &ArticleNormalizer<'_>,
    raws: &[RawArticle],
    prices: &[DailyPrice],
) -> PipelineOutput {
    let NormalizedBatch {
        articles,
        malformed,
    } = normalizer.normalize_all(raws);

    for (idx, err) in malformed.iter().enumerate().take(MAX_LOGGED_MALFORMED) {
        tracing::warn!(
            idx,
            title = %err.title,
            published_at = %err.published_at,
            reason = %err.reason,
            "skipping article with malformed timestamp"
        );
    }
    if malformed.len() > MAX_LOGGED_MALFORMED {
        tracing::warn!(
            skipped = malformed.len(),
            "more malformed articles skipped; only the first {MAX_LOGGED_MALFORMED} were logged"
        );
    }

    let daily_sentiment = aggregate(&articles);
    let aligned = align(&daily_sentiment, prices);

    tracing::debug!(
        articles = articles.len(),
        days = daily_sentiment.len(),
        aligned = aligned.len(),
        skipped = malformed.len(),
        "pipeline finished"
    );

    PipelineOutput {
        articles,
        daily_sentiment,
        aligned,
        skipped_malformed: malformed.len(),
    }
}
