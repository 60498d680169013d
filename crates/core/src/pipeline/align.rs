use crate::domain::{AlignedPoint, DailyPrice, DailySentiment};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Full outer join of the daily sentiment and price series on calendar date.
///
/// Every date from either side appears exactly once, ascending. A side with no
/// value for a date is left as `None`. If an input repeats a date the later
/// entry wins.
pub fn align(sentiment: &[DailySentiment], prices: &[DailyPrice]) -> Vec<AlignedPoint> {
    let mut joined = BTreeMap::<NaiveDate, AlignedPoint>::new();

    for day in sentiment {
        let point = joined.entry(day.date).or_insert_with(|| empty_point(day.date));
        if point.sentiment.is_some() {
            tracing::warn!(date = %day.date, "duplicate sentiment date; keeping the later value");
        }
        point.sentiment = Some(day.mean_sentiment);
    }

    for price in prices {
        let point = joined
            .entry(price.date)
            .or_insert_with(|| empty_point(price.date));
        if point.price.is_some() {
            tracing::warn!(date = %price.date, "duplicate price date; keeping the later value");
        }
        point.price = Some(price.close);
    }

    joined.into_values().collect()
}

fn empty_point(date: NaiveDate) -> AlignedPoint {
    AlignedPoint {
        date,
        sentiment: None,
        price: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sent(day: u32, mean: f64) -> DailySentiment {
        DailySentiment {
            date: d(day),
            mean_sentiment: mean,
            article_count: 1,
        }
    }

    fn price(day: u32, close: f64) -> DailyPrice {
        DailyPrice { date: d(day), close }
    }

    #[test]
    fn both_empty_gives_empty() {
        assert!(align(&[], &[]).is_empty());
    }

    #[test]
    fn empty_prices_keep_every_sentiment_day() {
        let out = align(&[sent(3, 0.1), sent(2, -0.2)], &[]);
        assert_eq!(
            out,
            vec![
                AlignedPoint { date: d(2), sentiment: Some(-0.2), price: None },
                AlignedPoint { date: d(3), sentiment: Some(0.1), price: None },
            ]
        );
    }

    #[test]
    fn empty_sentiment_keeps_every_price_day() {
        let out = align(&[], &[price(4, 99.0), price(2, 100.0)]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| p.sentiment.is_none()));
        assert_eq!(out[0].date, d(2));
        assert_eq!(out[1].price, Some(99.0));
    }

    #[test]
    fn outer_join_marks_missing_sides() {
        let out = align(
            &[sent(2, 0.3), sent(5, -0.5), sent(6, 0.0)],
            &[price(2, 100.0), price(3, 98.0), price(5, 97.5)],
        );

        let dates: Vec<_> = out.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2), d(3), d(5), d(6)]);

        assert_eq!(out[0].sentiment, Some(0.3));
        assert_eq!(out[0].price, Some(100.0));
        assert!(out[0].is_complete());

        assert_eq!(out[1].sentiment, None);
        assert_eq!(out[1].price, Some(98.0));

        assert_eq!(out[2].sentiment, Some(-0.5));
        assert_eq!(out[2].price, Some(97.5));

        // A neutral day is still a present value, not a gap.
        assert_eq!(out[3].sentiment, Some(0.0));
        assert_eq!(out[3].price, None);
    }

    #[test]
    fn output_size_is_union_of_dates() {
        let sentiment: Vec<_> = [1, 3, 5, 7, 9].iter().map(|&day| sent(day, 0.1)).collect();
        let prices: Vec<_> = [2, 3, 4, 5, 10, 11]
            .iter()
            .map(|&day| price(day, 50.0 + day as f64))
            .collect();

        let out = align(&sentiment, &prices);
        let union: BTreeSet<_> = sentiment
            .iter()
            .map(|s| s.date)
            .chain(prices.iter().map(|p| p.date))
            .collect();

        assert_eq!(out.len(), union.len());
        assert!(out.windows(2).all(|w| w[0].date < w[1].date));
        for p in &prices {
            let point = out.iter().find(|a| a.date == p.date).unwrap();
            assert_eq!(point.price, Some(p.close));
        }
    }

    #[test]
    fn duplicate_dates_collapse_to_one_point() {
        let out = align(&[], &[price(2, 100.0), price(2, 101.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].price, Some(101.0));
    }
}
