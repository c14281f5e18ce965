//! Pure parsers for recognized text.
//!
//! Both parsers are deterministic and side-effect free; what they match is
//! driven entirely by a [`Vocabulary`], so synonym tables can be replaced
//! without touching the session state machine.

mod command;
mod set_input;
mod vocabulary;

pub use command::{CommandParser, ControlCommand};
pub use set_input::{ParsedSet, SetInputParser};
pub use vocabulary::{
    CommandVocabulary, RepKeyword, SetInputVocabulary, Vocabulary, VocabularyError, WeightKeyword,
};
