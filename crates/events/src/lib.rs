//! Event contracts emitted by the session controller.
//!
//! Renderers (terminal, GUI, tests) subscribe through an [`EventBus`] and
//! deserialize the payloads below. Keeping the DTOs here prevents drift
//! between producer and consumers.

mod bus;

pub use bus::{EmittedEvent, EventBus, EventBusExt, EventBusRef, InMemoryEventBus, NullEventBus};

use liftvox_workout::SetRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full render state, emitted after every state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshotEvent {
    pub workout_name: String,
    /// "idle", "running", "paused" or "finished".
    pub run_state: String,
    pub elapsed_ms: u64,
    /// "inactive", "awaiting_command" or "awaiting_set_input".
    pub voice_mode: String,
    #[serde(default)]
    pub voice_target: Option<VoiceTargetPayload>,
    pub voice_available: bool,
    pub exercises: Vec<ExerciseRow>,
    pub overall_percent: u8,
}

/// One row of the exercise list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRow {
    pub name: String,
    pub target_sets: u32,
    pub recorded_sets: Vec<SetRecord>,
    /// Sets from the last session of this workout ("last time").
    #[serde(default)]
    pub previous_sets: Vec<SetRecord>,
    pub percent: u8,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceTargetPayload {
    pub exercise: String,
    pub position: usize,
    /// 1-based ordinal of the set being asked for.
    pub set_number: u32,
}

/// Where a committed set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetSource {
    Voice,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecordedEvent {
    pub exercise: String,
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub source: SetSource,
    pub message: String,
}

/// Ask the renderer to open the set-entry dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntryRequestedEvent {
    pub exercise: String,
    pub position: usize,
    pub set_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicePromptEvent {
    pub exercise: String,
    pub set_number: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceErrorEvent {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrecognizedCommandEvent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseFailedEvent {
    pub exercise: String,
    pub text: String,
    /// Consecutive failures for this target, starting at 1.
    pub attempt: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFinishedEvent {
    pub session_id: Uuid,
    pub workout_name: String,
    pub duration_ms: u64,
    pub total_sets: usize,
}

/// Free-form user-facing notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeEvent {
    pub message: String,
}

impl NoticeEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Full render state.
    pub const SESSION_SNAPSHOT: &str = "session:snapshot";
    pub const SET_RECORDED: &str = "session:set_recorded";
    /// Manual set-entry dialog requested.
    pub const SET_ENTRY_REQUESTED: &str = "session:set_entry_requested";
    pub const SESSION_FINISHED: &str = "session:finished";
    pub const SAVE_FAILED: &str = "session:save_failed";
    /// A user action sent through the handle was refused.
    pub const ACTION_REJECTED: &str = "session:action_rejected";

    pub const VOICE_READY: &str = "voice:ready";
    pub const VOICE_LISTENING: &str = "voice:listening";
    pub const VOICE_PROMPT: &str = "voice:prompt";
    pub const VOICE_ERROR: &str = "voice:error";
    pub const UNRECOGNIZED_COMMAND: &str = "voice:unrecognized_command";
    pub const PARSE_FAILED: &str = "voice:parse_failed";
    pub const RETRIES_EXHAUSTED: &str = "voice:retries_exhausted";
    pub const ALL_COMPLETE: &str = "voice:all_complete";
    pub const VOICE_UNAVAILABLE: &str = "voice:unavailable";
    pub const PERMISSION_REQUIRED: &str = "voice:permission_required";
}
