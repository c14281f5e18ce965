//! Control-command classification.

use serde::{Deserialize, Serialize};

use crate::vocabulary::CommandVocabulary;

/// Intent derived from recognized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCommand {
    Start,
    Stop,
    Finish,
    AdvanceToNextIncomplete,
    SwitchToVoiceSetInput,
    Unknown,
}

impl ControlCommand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Finish => "finish",
            Self::AdvanceToNextIncomplete => "advance",
            Self::SwitchToVoiceSetInput => "voice_input",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Maps free text to a [`ControlCommand`] by synonym substring.
///
/// Categories are tried in a fixed order (start, stop, finish, advance,
/// voice input); the first category with a matching synonym wins.
#[derive(Debug, Clone)]
pub struct CommandParser {
    table: Vec<(ControlCommand, Vec<String>)>,
}

impl CommandParser {
    pub fn new(vocabulary: &CommandVocabulary) -> Self {
        let fold = |list: &[String]| -> Vec<String> {
            list.iter()
                .map(|s| normalize(s))
                .filter(|s| !s.is_empty())
                .collect()
        };

        Self {
            table: vec![
                (ControlCommand::Start, fold(&vocabulary.start)),
                (ControlCommand::Stop, fold(&vocabulary.stop)),
                (ControlCommand::Finish, fold(&vocabulary.finish)),
                (
                    ControlCommand::AdvanceToNextIncomplete,
                    fold(&vocabulary.advance),
                ),
                (
                    ControlCommand::SwitchToVoiceSetInput,
                    fold(&vocabulary.voice_input),
                ),
            ],
        }
    }

    pub fn classify(&self, text: &str) -> ControlCommand {
        let text = normalize(text);
        if text.is_empty() {
            return ControlCommand::Unknown;
        }

        self.table
            .iter()
            .find(|(_, synonyms)| synonyms.iter().any(|s| text.contains(s.as_str())))
            .map(|(command, _)| *command)
            .unwrap_or(ControlCommand::Unknown)
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(&CommandVocabulary::default())
    }
}

/// Case-fold and collapse whitespace so multi-word synonyms match.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_synonyms() {
        let parser = CommandParser::default();
        assert_eq!(parser.classify("Start"), ControlCommand::Start);
        assert_eq!(parser.classify("ok let's go"), ControlCommand::Start);
        assert_eq!(parser.classify("please RESUME the workout"), ControlCommand::Start);
    }

    #[test]
    fn test_each_category() {
        let parser = CommandParser::default();
        assert_eq!(parser.classify("pause"), ControlCommand::Stop);
        assert_eq!(parser.classify("I'm done"), ControlCommand::Finish);
        assert_eq!(parser.classify("next"), ControlCommand::AdvanceToNextIncomplete);
        assert_eq!(parser.classify("log set"), ControlCommand::SwitchToVoiceSetInput);
    }

    #[test]
    fn test_unknown() {
        let parser = CommandParser::default();
        assert_eq!(parser.classify("what's the weather"), ControlCommand::Unknown);
        assert_eq!(parser.classify(""), ControlCommand::Unknown);
        assert_eq!(parser.classify("   "), ControlCommand::Unknown);
    }

    #[test]
    fn test_unpause_is_start_not_stop() {
        let parser = CommandParser::default();
        assert_eq!(parser.classify("unpause"), ControlCommand::Start);
    }

    #[test]
    fn test_multi_word_synonym_tolerates_spacing() {
        let parser = CommandParser::default();
        assert_eq!(parser.classify("add   a  set"), ControlCommand::AdvanceToNextIncomplete);
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocabulary = CommandVocabulary {
            start: vec!["lift off".to_string()],
            ..CommandVocabulary::default()
        };
        let parser = CommandParser::new(&vocabulary);
        assert_eq!(parser.classify("Lift off!"), ControlCommand::Start);
        assert_eq!(parser.classify("start"), ControlCommand::Unknown);
    }
}
