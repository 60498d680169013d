use crate::domain::{DailySentiment, ScoredArticle};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Collapses scored articles into one unweighted mean per calendar day, ascending by date.
pub fn aggregate(articles: &[ScoredArticle]) -> Vec<DailySentiment> {
    let mut by_date = BTreeMap::<NaiveDate, (f64, usize)>::new();
    for article in articles {
        let entry = by_date.entry(article.published_date).or_insert((0.0, 0));
        entry.0 += article.sentiment;
        entry.1 += 1;
    }

    by_date
        .into_iter()
        .map(|(date, (sum, count))| DailySentiment {
            date,
            mean_sentiment: sum / count as f64,
            article_count: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(day: u32, sentiment: f64) -> ScoredArticle {
        let published_at = Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap();
        ScoredArticle {
            title: format!("day {day}"),
            description: None,
            source: "Test".to_string(),
            published_at,
            published_date: published_at.date_naive(),
            sentiment,
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn computes_mean_and_count_per_day() {
        let articles = vec![
            article(3, 0.5),
            article(2, 0.8),
            article(2, -0.4),
            article(3, -0.1),
            article(2, 0.2),
        ];
        let daily = aggregate(&articles);
        assert_eq!(daily.len(), 2);

        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(daily[0].article_count, 3);
        assert!((daily[0].mean_sentiment - (0.8 - 0.4 + 0.2) / 3.0).abs() < 1e-12);

        assert_eq!(daily[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(daily[1].article_count, 2);
        assert!((daily[1].mean_sentiment - 0.2).abs() < 1e-12);
    }

    #[test]
    fn counts_sum_to_input_length() {
        let articles: Vec<_> = (1..=20)
            .map(|i| article(1 + i % 5, (i as f64 / 10.0) - 1.0))
            .collect();
        let daily = aggregate(&articles);
        let total: usize = daily.iter().map(|d| d.article_count).sum();
        assert_eq!(total, articles.len());
        assert!(daily.windows(2).all(|w| w[0].date < w[1].date));
        assert!(daily
            .iter()
            .all(|d| (-1.0..=1.0).contains(&d.mean_sentiment)));
    }
}
