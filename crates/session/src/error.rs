//! Error types for session control.

use std::path::PathBuf;

use liftvox_parse::VocabularyError;
use liftvox_speech::SpeechError;
use liftvox_workout::WorkoutError;
use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Why a session operation was refused.
///
/// None of these end the session; the controller is always left in a state
/// the user can continue from.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session already finished")]
    Finished,

    #[error("A recognition attempt is already in progress")]
    RecognitionInProgress,

    #[error("Speech recognition is not available on this host")]
    VoiceUnavailable,

    #[error("Microphone permission not granted; a request has been issued")]
    PermissionDenied,

    #[error("Unknown exercise '{0}'")]
    UnknownExercise(String),

    #[error("Exercise '{0}' already has all of its sets")]
    ExerciseComplete(String),

    #[error("Invalid set: {0}")]
    InvalidSet(#[from] WorkoutError),

    #[error("Recognition engine error: {0}")]
    Speech(#[from] SpeechError),

    /// The session finished but could not be saved. The completed record is
    /// kept on the controller.
    #[error("Failed to save session: {0}")]
    Persistence(String),
}

/// Errors loading a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
}
