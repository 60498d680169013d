use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

const FINLEX_V1: &str = include_str!("../../data/finlex_v1.tsv");

static BUILTIN: OnceLock<Lexicon> = OnceLock::new();

/// Constants driving the rule adjustments in the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRules {
    pub negation_window: usize,
    pub negation_scalar: f64,
    /// Booster weight lost per extra token of distance (distance 2 keeps `1 - decay`).
    pub booster_decay: f64,
    pub caps_increment: f64,
    pub exclamation_increment: f64,
    pub max_exclamations: usize,
    pub question_increment: f64,
    pub max_questions: usize,
    pub but_before: f64,
    pub but_after: f64,
    pub normalization_alpha: f64,
}

/// Immutable polarity table: token valences, degree modifiers, negations and rule constants.
#[derive(Debug, Clone)]
pub struct Lexicon {
    version: String,
    valence: HashMap<String, f64>,
    boosters: HashMap<String, f64>,
    negations: HashSet<String>,
    rules: ScoringRules,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexiconError {
    MissingVersion,
    MalformedRow { line: usize, detail: String },
    UnknownKind { line: usize, kind: String },
    InvalidNumber { line: usize, value: String },
    DuplicateToken { line: usize, token: String },
    UnknownRule { line: usize, name: String },
    MissingRule(&'static str),
}

impl fmt::Display for LexiconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVersion => write!(f, "lexicon table has no version row"),
            Self::MalformedRow { line, detail } => write!(f, "line {line}: {detail}"),
            Self::UnknownKind { line, kind } => write!(f, "line {line}: unknown row kind {kind:?}"),
            Self::InvalidNumber { line, value } => {
                write!(f, "line {line}: {value:?} is not a number")
            }
            Self::DuplicateToken { line, token } => {
                write!(f, "line {line}: token {token:?} is listed more than once")
            }
            Self::UnknownRule { line, name } => write!(f, "line {line}: unknown rule {name:?}"),
            Self::MissingRule(name) => write!(f, "lexicon table is missing rule {name:?}"),
        }
    }
}

impl std::error::Error for LexiconError {}

impl Lexicon {
    /// The compiled-in `finlex-1` table, parsed on first use.
    pub fn builtin() -> &'static Lexicon {
        BUILTIN.get_or_init(|| {
            Lexicon::from_tsv(FINLEX_V1).expect("compiled-in finlex table must parse")
        })
    }

    /// Parses a tab-separated table of `version`, `rule`, `valence`, `booster`
    /// and `negation` rows. Blank lines and `#` comments are ignored.
    pub fn from_tsv(text: &str) -> Result<Self, LexiconError> {
        let mut version = None;
        let mut rules = BTreeMap::<String, f64>::new();
        let mut valence = HashMap::new();
        let mut boosters = HashMap::new();
        let mut negations = HashSet::new();
        let mut seen = HashSet::<String>::new();

        for (idx, raw_line) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
            let kind = fields[0];
            let key = fields.get(1).copied().unwrap_or_default();
            if key.is_empty() {
                return Err(LexiconError::MalformedRow {
                    line,
                    detail: format!("{kind} row needs a second column"),
                });
            }

            match kind {
                "version" => version = Some(key.to_string()),
                "rule" => {
                    if !RULE_NAMES.contains(&key) {
                        return Err(LexiconError::UnknownRule {
                            line,
                            name: key.to_string(),
                        });
                    }
                    rules.insert(key.to_string(), number(line, fields.get(2))?);
                }
                "valence" | "booster" | "negation" => {
                    let token = key.to_lowercase();
                    if !seen.insert(token.clone()) {
                        return Err(LexiconError::DuplicateToken { line, token });
                    }
                    match kind {
                        "valence" => {
                            valence.insert(token, number(line, fields.get(2))?);
                        }
                        "booster" => {
                            boosters.insert(token, number(line, fields.get(2))?);
                        }
                        _ => {
                            negations.insert(token);
                        }
                    }
                }
                other => {
                    return Err(LexiconError::UnknownKind {
                        line,
                        kind: other.to_string(),
                    })
                }
            }
        }

        let version = version.ok_or(LexiconError::MissingVersion)?;
        let rules = ScoringRules::from_map(&rules)?;

        Ok(Self {
            version,
            valence,
            boosters,
            negations,
            rules,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn valence(&self, token: &str) -> Option<f64> {
        self.valence.get(token).copied()
    }

    pub fn booster(&self, token: &str) -> Option<f64> {
        self.boosters.get(token).copied()
    }

    /// True for listed negations and for any `n't` contraction.
    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token) || token.ends_with("n't") || token.ends_with("n\u{2019}t")
    }
}

const RULE_NAMES: [&str; 11] = [
    "negation_window",
    "negation_scalar",
    "booster_decay",
    "caps_increment",
    "exclamation_increment",
    "max_exclamations",
    "question_increment",
    "max_questions",
    "but_before",
    "but_after",
    "normalization_alpha",
];

impl ScoringRules {
    fn from_map(map: &BTreeMap<String, f64>) -> Result<Self, LexiconError> {
        let get = |name: &'static str| map.get(name).copied().ok_or(LexiconError::MissingRule(name));
        let count = |name: &'static str| get(name).map(|v| v.max(0.0) as usize);

        Ok(Self {
            negation_window: count("negation_window")?,
            negation_scalar: get("negation_scalar")?,
            booster_decay: get("booster_decay")?,
            caps_increment: get("caps_increment")?,
            exclamation_increment: get("exclamation_increment")?,
            max_exclamations: count("max_exclamations")?,
            question_increment: get("question_increment")?,
            max_questions: count("max_questions")?,
            but_before: get("but_before")?,
            but_after: get("but_after")?,
            normalization_alpha: get("normalization_alpha")?,
        })
    }
}

fn number(line: usize, field: Option<&&str>) -> Result<f64, LexiconError> {
    let value = field.copied().unwrap_or_default();
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LexiconError::InvalidNumber {
            line,
            value: value.to_string(),
        })
}
