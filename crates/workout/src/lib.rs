//! Workout domain model.
//!
//! Plain data shared by the session controller and the persistence layer.
//! The repository traits live here so storage can be swapped without the
//! controller knowing which backend it talks to.

mod model;
mod repository;

pub use model::{CompletedSession, Exercise, ExerciseOutcome, SetRecord, Workout};
pub use repository::{SessionRepository, WorkoutRepository};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkoutError {
    #[error("workout name must not be empty")]
    EmptyName,
    #[error("workout '{0}' has no exercises")]
    NoExercises(String),
    #[error("exercise name must not be empty")]
    EmptyExerciseName,
    #[error("duplicate exercise '{0}'")]
    DuplicateExercise(String),
    #[error("exercise '{name}' needs at least one set (got {sets})")]
    InvalidTargetSets { name: String, sets: u32 },
    #[error("weight must be a finite, non-negative number (got {0})")]
    InvalidWeight(f64),
    #[error("reps must be positive")]
    InvalidReps,
}

pub type Result<T> = std::result::Result<T, WorkoutError>;
