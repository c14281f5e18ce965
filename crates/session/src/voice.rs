//! Voice-mode axis of the session state machine.

use crate::progress::ExerciseId;

/// Exercise that the next recognized set utterance applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceTarget {
    pub exercise: ExerciseId,
    /// 1-based ordinal of the set being asked for.
    pub set_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceMode {
    #[default]
    Inactive,
    AwaitingCommand,
    AwaitingSetInput(VoiceTarget),
}

impl VoiceMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::AwaitingCommand => "awaiting_command",
            Self::AwaitingSetInput(_) => "awaiting_set_input",
        }
    }

    pub fn target(&self) -> Option<VoiceTarget> {
        match self {
            Self::AwaitingSetInput(target) => Some(*target),
            _ => None,
        }
    }
}

/// What a recognition attempt is for, before the engine is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VoiceRequest {
    Command,
    SetInput(ExerciseId),
}
