use crate::domain::{AlignedPoint, DailyPrice, DailySentiment, RawArticle, ScoredArticle};
use crate::pipeline::{self, PipelineOutput};
use crate::time::window::DateWindow;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub ticker: String,
    pub query: String,
    pub period: String,
    pub window: DateWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub articles_received: usize,
    pub articles_scored: usize,
    pub skipped_malformed: usize,
    pub average_sentiment: Option<f64>,
    pub overlap_days: usize,
    /// Pearson coefficient over days with both values. Descriptive only.
    pub correlation: Option<f64>,
}

/// Everything the chart and listing renderers need for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub request: ReportRequest,
    pub metrics: Metrics,
    pub top_articles: Vec<ScoredArticle>,
    pub articles: Vec<ScoredArticle>,
    pub daily_sentiment: Vec<DailySentiment>,
    pub aligned: Vec<AlignedPoint>,
}

impl Report {
    pub fn build(
        request: ReportRequest,
        raws: &[RawArticle],
        prices: &[DailyPrice],
        top_n: usize,
    ) -> Self {
        let PipelineOutput {
            articles,
            daily_sentiment,
            aligned,
            skipped_malformed,
        } = pipeline::run(raws, prices);

        let average_sentiment = (!articles.is_empty())
            .then(|| articles.iter().map(|a| a.sentiment).sum::<f64>() / articles.len() as f64);

        let metrics = Metrics {
            articles_received: raws.len(),
            articles_scored: articles.len(),
            skipped_malformed,
            average_sentiment,
            overlap_days: aligned.iter().filter(|p| p.is_complete()).count(),
            correlation: pearson(&aligned),
        };

        Self {
            request,
            metrics,
            top_articles: top_by_magnitude(&articles, top_n),
            articles,
            daily_sentiment,
            aligned,
        }
    }
}

/// Articles with the strongest sentiment either way, strongest first.
pub fn top_by_magnitude(articles: &[ScoredArticle], n: usize) -> Vec<ScoredArticle> {
    let mut ranked: Vec<&ScoredArticle> = articles.iter().collect();
    // Stable sort: equal magnitudes stay in chronological order.
    ranked.sort_by(|a, b| b.sentiment.abs().total_cmp(&a.sentiment.abs()));
    ranked.into_iter().take(n).cloned().collect()
}

/// Sentiment/close correlation over days where both are present.
///
/// `None` with fewer than two such days or when either side is constant.
pub fn pearson(aligned: &[AlignedPoint]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = aligned
        .iter()
        .filter_map(|p| Some((p.sentiment?, p.price?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn point(day: u32, sentiment: Option<f64>, price: Option<f64>) -> AlignedPoint {
        AlignedPoint {
            date: d(day),
            sentiment,
            price,
        }
    }

    fn scored(day: u32, hour: u32, title: &str, sentiment: f64) -> ScoredArticle {
        let published_at = Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap();
        ScoredArticle {
            title: title.to_string(),
            description: None,
            source: "Wire".to_string(),
            published_at,
            published_date: published_at.date_naive(),
            sentiment,
        }
    }

    fn request() -> ReportRequest {
        ReportRequest {
            ticker: "AAPL".to_string(),
            query: "finance".to_string(),
            period: "10d".to_string(),
            window: DateWindow {
                start: d(1),
                end: d(10),
            },
        }
    }

    #[test]
    fn pearson_needs_two_complete_days() {
        assert_eq!(pearson(&[]), None);
        assert_eq!(
            pearson(&[point(1, Some(0.2), Some(10.0)), point(2, None, Some(11.0))]),
            None
        );
    }

    #[test]
    fn pearson_detects_perfect_relationships() {
        let up = [
            point(1, Some(-0.5), Some(10.0)),
            point(2, Some(0.0), Some(11.0)),
            point(3, None, Some(50.0)),
            point(4, Some(0.5), Some(12.0)),
        ];
        assert!((pearson(&up).unwrap() - 1.0).abs() < 1e-9);

        let down = [
            point(1, Some(0.5), Some(10.0)),
            point(2, Some(0.0), Some(11.0)),
            point(3, Some(-0.5), Some(12.0)),
        ];
        assert!((pearson(&down).unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_is_none_for_constant_series() {
        let flat = [
            point(1, Some(0.1), Some(10.0)),
            point(2, Some(0.1), Some(11.0)),
        ];
        assert_eq!(pearson(&flat), None);
    }

    #[test]
    fn top_articles_rank_by_magnitude() {
        let articles = vec![
            scored(1, 9, "mild", 0.1),
            scored(1, 10, "awful", -0.9),
            scored(2, 9, "great", 0.7),
            scored(2, 10, "stellar", 0.9),
        ];
        let top = top_by_magnitude(&articles, 3);
        let titles: Vec<_> = top.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["awful", "stellar", "great"]);
        assert_eq!(top_by_magnitude(&articles, 10).len(), 4);
    }

    #[test]
    fn build_fills_metrics() {
        let raws = vec![
            RawArticle {
                title: "Shares surge on strong demand".to_string(),
                description: None,
                source_name: "Wire".to_string(),
                published_at: "2024-01-02T10:00:00Z".to_string(),
            },
            RawArticle {
                title: "Outlook weak as sales slump".to_string(),
                description: None,
                source_name: "Wire".to_string(),
                published_at: "2024-01-03T10:00:00Z".to_string(),
            },
            RawArticle {
                title: "No timestamp".to_string(),
                description: None,
                source_name: "Wire".to_string(),
                published_at: String::new(),
            },
        ];
        let prices = vec![
            DailyPrice { date: d(2), close: 101.0 },
            DailyPrice { date: d(3), close: 97.0 },
            DailyPrice { date: d(4), close: 98.0 },
        ];

        let report = Report::build(request(), &raws, &prices, DEFAULT_TOP_N);
        assert_eq!(report.metrics.articles_received, 3);
        assert_eq!(report.metrics.articles_scored, 2);
        assert_eq!(report.metrics.skipped_malformed, 1);
        assert_eq!(report.metrics.overlap_days, 2);
        assert!((report.metrics.correlation.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(report.aligned.len(), 3);
        assert_eq!(report.top_articles.len(), 2);

        let expected_avg = (report.articles[0].sentiment + report.articles[1].sentiment) / 2.0;
        assert_eq!(report.metrics.average_sentiment, Some(expected_avg));
    }

    #[test]
    fn build_without_articles_has_no_average() {
        let report = Report::build(request(), &[], &[], DEFAULT_TOP_N);
        assert_eq!(report.metrics.average_sentiment, None);
        assert_eq!(report.metrics.correlation, None);
        assert!(report.top_articles.is_empty());
    }
}
