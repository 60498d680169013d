use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub mean_sentiment: f64,
    pub article_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPrice {
    pub date: NaiveDate,
    pub close: f64,
}

/// One day of the joined sentiment/price series.
///
/// `None` means the day exists only on the other side of the join. Consumers
/// decide how to draw the gap; the aligner never fills it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPoint {
    pub date: NaiveDate,
    pub sentiment: Option<f64>,
    pub price: Option<f64>,
}

impl AlignedPoint {
    pub fn is_complete(&self) -> bool {
        self.sentiment.is_some() && self.price.is_some()
    }
}
