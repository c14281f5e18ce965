//! Synonym and keyword tables.
//!
//! Defaults are English. A JSON file with the same shape replaces any
//! section it names; omitted sections keep their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid vocabulary: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rep keyword {words:?} must map to a positive count")]
    InvalidRepKeyword { words: Vec<String> },
    #[error("weight keyword {words:?} must map to a non-negative weight")]
    InvalidWeightKeyword { words: Vec<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub commands: CommandVocabulary,
    pub set_input: SetInputVocabulary,
}

impl Vocabulary {
    pub fn from_json_str(json: &str) -> Result<Self, VocabularyError> {
        let vocabulary: Self = serde_json::from_str(json)?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, VocabularyError> {
        let json = std::fs::read_to_string(path).map_err(|e| VocabularyError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), VocabularyError> {
        for keyword in &self.set_input.rep_keywords {
            if keyword.reps == 0 {
                return Err(VocabularyError::InvalidRepKeyword {
                    words: keyword.words.clone(),
                });
            }
        }
        for keyword in &self.set_input.weight_keywords {
            if !keyword.weight.is_finite() || keyword.weight < 0.0 {
                return Err(VocabularyError::InvalidWeightKeyword {
                    words: keyword.words.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Synonym substrings per control command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandVocabulary {
    pub start: Vec<String>,
    pub stop: Vec<String>,
    pub finish: Vec<String>,
    pub advance: Vec<String>,
    pub voice_input: Vec<String>,
}

impl Default for CommandVocabulary {
    fn default() -> Self {
        Self {
            start: words(&["start", "begin", "resume", "unpause", "let's go"]),
            stop: words(&["stop", "pause", "hold on", "halt"]),
            finish: words(&["finish", "done", "end workout", "complete workout", "wrap up"]),
            advance: words(&["next", "add set", "add a set", "another set"]),
            voice_input: words(&[
                "voice input",
                "dictate",
                "by voice",
                "enter set",
                "record set",
                "log set",
            ]),
        }
    }
}

/// Spoken rep count, e.g. "ten" or "10" -> 10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepKeyword {
    pub reps: u32,
    pub words: Vec<String>,
}

/// Spoken round weight, e.g. "hundred" -> 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightKeyword {
    pub weight: f64,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetInputVocabulary {
    /// Filler and unit tokens dropped before number extraction.
    pub fillers: Vec<String>,
    /// Fallback table, checked in order; first match wins.
    pub rep_keywords: Vec<RepKeyword>,
    pub weight_keywords: Vec<WeightKeyword>,
}

impl Default for SetInputVocabulary {
    fn default() -> Self {
        Self {
            fillers: words(&[
                "kilograms", "kilogram", "kilos", "kilo", "kgs", "kg", "pounds", "pound", "lbs",
                "lb", "repetitions", "repetition", "reps", "rep", "times", "x", "by", "and",
                "for", "with", "at", "of", "the", "a", "set", "sets", "did", "i",
            ]),
            rep_keywords: vec![
                rep(10, &["ten", "10"]),
                rep(15, &["fifteen", "15"]),
                rep(20, &["twenty", "20"]),
                rep(12, &["twelve", "12"]),
                rep(8, &["eight", "8"]),
                rep(5, &["five", "5"]),
            ],
            weight_keywords: vec![WeightKeyword {
                weight: 100.0,
                words: words(&["hundred"]),
            }],
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn rep(reps: u32, list: &[&str]) -> RepKeyword {
    RepKeyword {
        reps,
        words: words(list),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let vocabulary =
            Vocabulary::from_json_str(r#"{"commands": {"start": ["go"]}}"#).unwrap();
        assert_eq!(vocabulary.commands.start, vec!["go".to_string()]);
        assert_eq!(vocabulary.commands.stop, CommandVocabulary::default().stop);
        assert_eq!(vocabulary.set_input, SetInputVocabulary::default());
    }

    #[test]
    fn test_rejects_zero_rep_keyword() {
        let json = r#"{"set_input": {"rep_keywords": [{"reps": 0, "words": ["zero"]}]}}"#;
        assert!(matches!(
            Vocabulary::from_json_str(json),
            Err(VocabularyError::InvalidRepKeyword { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Vocabulary::from_json_str("{not json"),
            Err(VocabularyError::Parse(_))
        ));
    }
}
