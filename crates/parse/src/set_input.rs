//! Weight/reps extraction from a spoken set description.
//!
//! 1. Case-fold, split glued tokens ("50kg" -> "50 kg"), drop fillers/units.
//! 2. Collect every decimal number left to right.
//! 3. One number: reps. Two numbers: weight then reps.
//! 4. Otherwise fall back to the keyword tables; with more than two numbers
//!    and no keyword, the first whole number is taken as reps.
//!
//! `reps == 0` in the result means the text could not be parsed.

use std::collections::HashSet;
use std::sync::LazyLock;

use liftvox_workout::SetRecord;
use regex::Regex;

use crate::vocabulary::{RepKeyword, SetInputVocabulary, WeightKeyword};

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"));

/// Digit glued to a letter on either side.
static GLUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d)(\p{L})|(\p{L})(\d)").expect("glue pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedSet {
    pub weight: f64,
    pub reps: u32,
}

impl ParsedSet {
    const FAILED: Self = Self {
        weight: 0.0,
        reps: 0,
    };

    pub fn is_success(&self) -> bool {
        self.reps > 0
    }

    /// The set to commit, or `None` on parse failure.
    pub fn to_record(&self) -> Option<SetRecord> {
        SetRecord::new(self.weight, self.reps).ok()
    }
}

#[derive(Debug, Clone)]
pub struct SetInputParser {
    fillers: HashSet<String>,
    rep_keywords: Vec<RepKeyword>,
    weight_keywords: Vec<WeightKeyword>,
}

impl SetInputParser {
    pub fn new(vocabulary: &SetInputVocabulary) -> Self {
        let lower = |words: &[String]| -> Vec<String> {
            words.iter().map(|w| w.to_lowercase()).collect()
        };

        Self {
            fillers: vocabulary.fillers.iter().map(|w| w.to_lowercase()).collect(),
            rep_keywords: vocabulary
                .rep_keywords
                .iter()
                .map(|k| RepKeyword {
                    reps: k.reps,
                    words: lower(&k.words),
                })
                .collect(),
            weight_keywords: vocabulary
                .weight_keywords
                .iter()
                .map(|k| WeightKeyword {
                    weight: k.weight,
                    words: lower(&k.words),
                })
                .collect(),
        }
    }

    pub fn parse(&self, text: &str) -> ParsedSet {
        let tokens = self.clean_tokens(text);
        let cleaned = tokens.join(" ");
        let numbers: Vec<&str> = NUMBER_RE.find_iter(&cleaned).map(|m| m.as_str()).collect();

        let parsed = match numbers.as_slice() {
            [reps] => ParsedSet {
                weight: 0.0,
                reps: whole(reps),
            },
            [weight, reps] => ParsedSet {
                weight: weight.parse().unwrap_or(0.0),
                reps: whole(reps),
            },
            _ => self.fallback(&tokens, &numbers),
        };

        tracing::debug!(
            input = text,
            cleaned = %cleaned,
            weight = parsed.weight,
            reps = parsed.reps,
            "Parsed set input"
        );
        parsed
    }

    fn clean_tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let separated = GLUE_RE.replace_all(&lowered, "$1$3 $2$4");

        separated
            .split(|c: char| c.is_whitespace() || c == ',')
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| !token.is_empty() && !self.fillers.contains(*token))
            .map(str::to_string)
            .collect()
    }

    fn fallback(&self, tokens: &[String], numbers: &[&str]) -> ParsedSet {
        let has_token = |words: &[String]| words.iter().any(|w| tokens.contains(w));

        let weight = self
            .weight_keywords
            .iter()
            .find(|k| has_token(&k.words))
            .map(|k| k.weight)
            .unwrap_or(0.0);

        let reps = self
            .rep_keywords
            .iter()
            .find(|k| has_token(&k.words))
            .map(|k| k.reps)
            .or_else(|| numbers.iter().find_map(|n| n.parse::<u32>().ok()))
            .unwrap_or(0);

        if reps == 0 {
            return ParsedSet { weight, ..ParsedSet::FAILED };
        }
        ParsedSet { weight, reps }
    }
}

impl Default for SetInputParser {
    fn default() -> Self {
        Self::new(&SetInputVocabulary::default())
    }
}

/// Whole-number reps; fractional or oversized values count as failure.
fn whole(number: &str) -> u32 {
    number.parse().unwrap_or(0)
}
