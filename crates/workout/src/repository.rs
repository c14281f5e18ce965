use crate::{CompletedSession, Workout};

/// Persistence for finished sessions.
/// Implemented by the storage layer; the controller only appends and reads.
pub trait SessionRepository: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn save_completed_session(&self, session: &CompletedSession) -> Result<(), Self::Error>;

    /// Most recent session of `workout_name` for `user`, used for the
    /// "last time" reference only.
    fn last_session_for(
        &self,
        workout_name: &str,
        user: &str,
    ) -> Result<Option<CompletedSession>, Self::Error>;

    /// All sessions for `user`, newest first.
    fn sessions_for(&self, user: &str) -> Result<Vec<CompletedSession>, Self::Error>;
}

/// Persistence for workout definitions.
pub trait WorkoutRepository: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Saves `workout`, replacing any workout of the same name for its owner.
    fn save_workout(&self, workout: &Workout) -> Result<(), Self::Error>;
    fn workouts_for(&self, user: &str) -> Result<Vec<Workout>, Self::Error>;
}
