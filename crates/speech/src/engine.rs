use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Error kinds reported by the recognizer for a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionErrorKind {
    Unavailable,
    PermissionDenied,
    NetworkError,
    NetworkTimeout,
    NoMatch,
    Busy,
    ServerError,
    SpeechTimeout,
    ClientError,
    Other,
}

impl RecognitionErrorKind {
    /// "Try again" signals that should not raise a user-visible alert.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::NoMatch | Self::SpeechTimeout)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::PermissionDenied => "permission_denied",
            Self::NetworkError => "network_error",
            Self::NetworkTimeout => "network_timeout",
            Self::NoMatch => "no_match",
            Self::Busy => "busy",
            Self::ServerError => "server_error",
            Self::SpeechTimeout => "speech_timeout",
            Self::ClientError => "client_error",
            Self::Other => "other",
        }
    }

    /// Human-readable message for alerts.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unavailable => "Speech recognition is not available on this device",
            Self::PermissionDenied => "Microphone permission is required",
            Self::NetworkError => "Network error",
            Self::NetworkTimeout => "Network timeout",
            Self::NoMatch => "Nothing recognized",
            Self::Busy => "Recognizer is busy",
            Self::ServerError => "Recognition server error",
            Self::SpeechTimeout => "No speech detected",
            Self::ClientError => "Recognizer client error",
            Self::Other => "Unknown recognition error",
        }
    }
}

impl std::fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One event of a recognition invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RecognitionEvent {
    Ready,
    Listening,
    Result(String),
    Error(RecognitionErrorKind),
}

impl RecognitionEvent {
    /// Whether this event ends the invocation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result(_) | Self::Error(_))
    }
}

/// Callback receiving the events of one invocation.
///
/// The controller passes a closure that forwards into its own inbox, so the
/// engine never touches controller state directly.
pub type RecognitionListener = Arc<dyn Fn(RecognitionEvent) + Send + Sync + 'static>;

/// Asynchronous speech recognizer.
///
/// At most one invocation may be outstanding; callers must not `start()`
/// again before the previous invocation delivered its terminal event or was
/// stopped.
pub trait RecognitionEngine: Send {
    /// Whether the capability exists on this host.
    fn is_available(&self) -> bool;

    /// Begin one recognition attempt. Returns immediately; events are
    /// delivered to `listener`.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Unavailable` if the capability is absent.
    fn start(&mut self, listener: RecognitionListener) -> crate::Result<()>;

    /// Stop the outstanding attempt, if any.
    fn stop(&mut self);

    /// Release resources. Idempotent; safe without a prior `start`.
    fn destroy(&mut self);
}

/// Engine for hosts without speech recognition.
#[derive(Debug, Default)]
pub struct UnavailableEngine;

impl RecognitionEngine for UnavailableEngine {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _listener: RecognitionListener) -> crate::Result<()> {
        Err(crate::SpeechError::Unavailable)
    }

    fn stop(&mut self) {}

    fn destroy(&mut self) {}
}
