//! Voice-driven workout session controller.
//!
//! [`SessionController`] owns one session: the run clock, the per-exercise
//! progress, and the voice lifecycle. It consumes a [`RecognitionEngine`]
//! and a [`PermissionGate`], parses utterances with the `liftvox-parse`
//! heuristics, and reports every change on an event bus. Finished sessions
//! go to a [`SessionRepository`].
//!
//! ```ignore
//! let controller = SessionController::new(workout, "anna", SessionConfig::default(), services);
//! let handle = controller.handle();
//! tokio::spawn(controller.run());
//! handle.send(UserAction::VoiceEnterSet);
//! ```
//!
//! [`RecognitionEngine`]: liftvox_speech::RecognitionEngine
//! [`PermissionGate`]: liftvox_speech::PermissionGate
//! [`SessionRepository`]: liftvox_workout::SessionRepository

mod clock;
mod config;
mod controller;
mod error;
mod progress;
mod timer;
mod voice;

pub use clock::{RunState, SessionClock};
pub use config::SessionConfig;
pub use controller::{SessionController, SessionHandle, SessionServices, UserAction};
pub use error::{ConfigError, Result, SessionError};
pub use progress::{ExerciseId, ExerciseProgressStore};
pub use voice::{VoiceMode, VoiceTarget};
