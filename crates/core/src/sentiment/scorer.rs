use crate::sentiment::lexicon::{Lexicon, ScoringRules};

/// Lexicon-and-rule sentence scorer producing a compound score in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy)]
pub struct SentimentScorer<'a> {
    lexicon: &'a Lexicon,
}

impl SentimentScorer<'static> {
    pub fn builtin() -> Self {
        Self::new(Lexicon::builtin())
    }
}

struct Token<'t> {
    raw: &'t str,
    lower: String,
}

impl Token<'_> {
    // Single letters ("I", "A") are not treated as shouting.
    fn is_shouting(&self) -> bool {
        let mut letters = 0usize;
        for c in self.raw.chars().filter(|c| c.is_alphabetic()) {
            if !c.is_uppercase() {
                return false;
            }
            letters += 1;
        }
        letters >= 2
    }
}

impl<'a> SentimentScorer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Compound score of `text` in `[-1.0, 1.0]`.
    ///
    /// Negation and intensifiers act on the lexicon words inside their window
    /// only. For a phrase that mixes polarities the sum can move either way:
    /// negating its leading negative words may raise the score, and boosting a
    /// word that the rest of the phrase outweighs can shrink the magnitude.
    pub fn score(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let rules = self.lexicon.rules();
        let caps_emphasis = is_mixed_case(&tokens);

        let mut weights: Vec<f64> = (0..tokens.len())
            .map(|i| self.token_weight(&tokens, i, caps_emphasis))
            .collect();
        apply_contrast(&tokens, &mut weights, rules);

        let mut sum: f64 = weights.iter().sum();
        if sum != 0.0 {
            sum += punctuation_emphasis(text, rules).copysign(sum);
        }

        normalize(sum, rules.normalization_alpha)
    }

    fn token_weight(&self, tokens: &[Token<'_>], i: usize, caps_emphasis: bool) -> f64 {
        let lex = self.lexicon;
        let rules = lex.rules();
        let token = &tokens[i];

        let base = match lex.valence(&token.lower) {
            Some(v) if v != 0.0 => v,
            _ => return 0.0,
        };

        let mut weight = base;
        if caps_emphasis && token.is_shouting() {
            weight += rules.caps_increment.copysign(base);
        }

        let start = i.saturating_sub(rules.negation_window);
        let window = &tokens[start..i];

        for (offset, prev) in window.iter().enumerate() {
            let Some(boost) = lex.booster(&prev.lower) else {
                continue;
            };
            let distance = window.len() - offset;
            // Positive boosters push away from zero, negative ones (dampeners) toward it.
            let mut scalar = if base < 0.0 { -boost } else { boost };
            if caps_emphasis && prev.is_shouting() {
                scalar += rules.caps_increment.copysign(base);
            }
            let decay = (1.0 - rules.booster_decay * (distance - 1) as f64).max(0.0);
            weight += scalar * decay;
        }

        for prev in window {
            if lex.is_negation(&prev.lower) {
                weight *= rules.negation_scalar;
            }
        }

        weight
    }
}

/// Scores `text` against the compiled-in lexicon.
pub fn score(text: &str) -> f64 {
    SentimentScorer::builtin().score(text)
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(|raw| Token {
            raw,
            lower: raw.to_lowercase(),
        })
        .collect()
}

fn is_mixed_case(tokens: &[Token<'_>]) -> bool {
    let shouting = tokens.iter().filter(|t| t.is_shouting()).count();
    shouting > 0 && shouting < tokens.len()
}

// Polarity before the first "but" is dampened, polarity after it amplified.
fn apply_contrast(tokens: &[Token<'_>], weights: &mut [f64], rules: &ScoringRules) {
    let Some(pivot) = tokens.iter().position(|t| t.lower == "but") else {
        return;
    };
    for (i, w) in weights.iter_mut().enumerate() {
        if i < pivot {
            *w *= rules.but_before;
        } else if i > pivot {
            *w *= rules.but_after;
        }
    }
}

fn punctuation_emphasis(text: &str, rules: &ScoringRules) -> f64 {
    let exclamations = text.matches('!').count().min(rules.max_exclamations);
    let questions = text.matches('?').count();
    let question_emphasis = if questions > 1 {
        questions.min(rules.max_questions) as f64 * rules.question_increment
    } else {
        0.0
    };
    exclamations as f64 * rules.exclamation_increment + question_emphasis
}

fn normalize(sum: f64, alpha: f64) -> f64 {
    if sum == 0.0 || !sum.is_finite() {
        return 0.0;
    }
    (sum / sum.hypot(alpha.max(0.0).sqrt())).clamp(-1.0, 1.0)
}
