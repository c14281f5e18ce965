//! Speech recognition contract.
//!
//! The platform recognizer is consumed only through [`RecognitionEngine`]:
//! `start()` returns immediately and the outcome arrives later as a sequence
//! of [`RecognitionEvent`]s ending in exactly one terminal event.
//!
//! ```text
//! start() ──► Ready ──► Listening ──► Result(text) | Error(kind)
//! ```

mod engine;
mod permission;
mod scripted;

pub use engine::{
    RecognitionEngine, RecognitionErrorKind, RecognitionEvent, RecognitionListener,
    UnavailableEngine,
};
pub use permission::{PermissionGate, PermissionGateRef, StaticPermission};
pub use scripted::{ScriptedEngine, ScriptedEngineProbe, ScriptedOutcome};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("speech recognition is not available on this host")]
    Unavailable,
    #[error("a recognition attempt is already outstanding")]
    Busy,
    #[error("recognition engine has been destroyed")]
    Destroyed,
}

pub type Result<T> = std::result::Result<T, SpeechError>;
