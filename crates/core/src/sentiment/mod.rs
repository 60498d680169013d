pub mod lexicon;
pub mod scorer;

pub use lexicon::{Lexicon, LexiconError, ScoringRules};
pub use scorer::{score, SentimentScorer};
