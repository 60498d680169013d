use crate::domain::{DailyPrice, RawArticle};
use crate::ingest::{NewsProvider, PriceProvider};
use crate::pipeline::{Report, ReportRequest};
use crate::time::window::{DateWindow, Period};
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub query: String,
    pub period: Period,
    pub window: DateWindow,
    pub top_n: usize,
}

#[derive(Debug, Clone)]
pub enum Analysis {
    NoArticles,
    NoPrices { articles: usize },
    Complete(Box<Report>),
}

/// Fetches both series for `request` and runs the scoring pipeline over them.
pub async fn analyze(
    news: &dyn NewsProvider,
    prices: &dyn PriceProvider,
    request: &AnalysisRequest,
) -> Result<Analysis> {
    let (articles, closes) = tokio::try_join!(
        async {
            news.fetch_articles(&request.query, request.window)
                .await
                .with_context(|| format!("{} fetch failed", news.provider_name()))
        },
        async {
            prices
                .fetch_daily_closes(&request.ticker, request.window)
                .await
                .with_context(|| format!("{} fetch failed", prices.provider_name()))
        },
    )?;

    Ok(assemble(request, &articles, &closes))
}

pub fn assemble(request: &AnalysisRequest, articles: &[RawArticle], closes: &[DailyPrice]) -> Analysis {
    if articles.is_empty() {
        return Analysis::NoArticles;
    }
    if closes.is_empty() {
        return Analysis::NoPrices {
            articles: articles.len(),
        };
    }

    let report_request = ReportRequest {
        ticker: request.ticker.clone(),
        query: request.query.clone(),
        period: request.period.to_string(),
        window: request.window,
    };
    let report = Report::build(report_request, articles, closes, request.top_n);

    tracing::info!(
        ticker = %request.ticker,
        articles = report.metrics.articles_scored,
        skipped = report.metrics.skipped_malformed,
        overlap_days = report.metrics.overlap_days,
        "analysis complete"
    );

    Analysis::Complete(Box::new(report))
}
