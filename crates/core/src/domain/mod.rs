pub mod article;
pub mod series;

pub use article::{MalformedArticle, RawArticle, ScoredArticle};
pub use series::{AlignedPoint, DailyPrice, DailySentiment};
