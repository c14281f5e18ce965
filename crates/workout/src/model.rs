use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, WorkoutError};

/// One completed set. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSetRecord")]
pub struct SetRecord {
    weight: f64,
    reps: u32,
}

impl SetRecord {
    pub fn new(weight: f64, reps: u32) -> Result<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(WorkoutError::InvalidWeight(weight));
        }
        if reps == 0 {
            return Err(WorkoutError::InvalidReps);
        }
        Ok(Self { weight, reps })
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }
}

#[derive(Deserialize)]
struct RawSetRecord {
    weight: f64,
    reps: u32,
}

impl TryFrom<RawSetRecord> for SetRecord {
    type Error = WorkoutError;

    fn try_from(raw: RawSetRecord) -> Result<Self> {
        Self::new(raw.weight, raw.reps)
    }
}

impl std::fmt::Display for SetRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.weight > 0.0 {
            write!(f, "{}kg × {}", self.weight, self.reps)
        } else {
            write!(f, "{} reps", self.reps)
        }
    }
}

/// A named movement with a target number of sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExercise")]
pub struct Exercise {
    pub name: String,
    pub target_sets: u32,
    /// Sets from the previous session, for display only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_sets: Vec<SetRecord>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, target_sets: u32) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(WorkoutError::EmptyExerciseName);
        }
        if target_sets == 0 {
            return Err(WorkoutError::InvalidTargetSets {
                name,
                sets: target_sets,
            });
        }
        Ok(Self {
            name,
            target_sets,
            previous_sets: Vec::new(),
        })
    }
}

#[derive(Deserialize)]
struct RawExercise {
    name: String,
    target_sets: u32,
    #[serde(default)]
    previous_sets: Vec<SetRecord>,
}

impl TryFrom<RawExercise> for Exercise {
    type Error = WorkoutError;

    fn try_from(raw: RawExercise) -> Result<Self> {
        let mut exercise = Self::new(raw.name, raw.target_sets)?;
        exercise.previous_sets = raw.previous_sets;
        Ok(exercise)
    }
}

/// A reusable workout definition owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWorkout")]
pub struct Workout {
    pub name: String,
    pub exercises: Vec<Exercise>,
    pub created_by: String,
}

impl Workout {
    /// Validates the definition: a name, at least one exercise, and unique
    /// exercise names.
    pub fn new(
        name: impl Into<String>,
        exercises: Vec<Exercise>,
        created_by: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(WorkoutError::EmptyName);
        }
        if exercises.is_empty() {
            return Err(WorkoutError::NoExercises(name));
        }

        let mut seen = HashSet::new();
        for exercise in &exercises {
            if exercise.name.trim().is_empty() {
                return Err(WorkoutError::EmptyExerciseName);
            }
            if exercise.target_sets == 0 {
                return Err(WorkoutError::InvalidTargetSets {
                    name: exercise.name.clone(),
                    sets: exercise.target_sets,
                });
            }
            if !seen.insert(exercise.name.as_str()) {
                return Err(WorkoutError::DuplicateExercise(exercise.name.clone()));
            }
        }

        Ok(Self {
            name,
            exercises,
            created_by: created_by.into(),
        })
    }

    pub fn exercise(&self, name: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.name == name)
    }
}

#[derive(Deserialize)]
struct RawWorkout {
    name: String,
    exercises: Vec<Exercise>,
    created_by: String,
}

impl TryFrom<RawWorkout> for Workout {
    type Error = WorkoutError;

    fn try_from(raw: RawWorkout) -> Result<Self> {
        Self::new(raw.name, raw.exercises, raw.created_by)
    }
}

/// Per-exercise result folded into a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOutcome {
    pub name: String,
    pub target_sets: u32,
    pub recorded_sets: Vec<SetRecord>,
}

impl ExerciseOutcome {
    pub fn is_complete(&self) -> bool {
        self.recorded_sets.len() >= self.target_sets as usize
    }
}

/// Output record handed to persistence when a session finishes.
///
/// Serializes to the boundary shape
/// `{ workoutName, exercises: [{ name, targetSets, recordedSets }], startedAt, durationMs, user }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub workout_name: String,
    pub exercises: Vec<ExerciseOutcome>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub user: String,
}

impl CompletedSession {
    pub fn exercise(&self, name: &str) -> Option<&ExerciseOutcome> {
        self.exercises.iter().find(|e| e.name == name)
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.recorded_sets.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_record_rejects_zero_reps() {
        assert_eq!(SetRecord::new(50.0, 0), Err(WorkoutError::InvalidReps));
    }

    #[test]
    fn test_set_record_rejects_negative_weight() {
        assert!(matches!(
            SetRecord::new(-1.0, 5),
            Err(WorkoutError::InvalidWeight(_))
        ));
        assert!(SetRecord::new(f64::NAN, 5).is_err());
    }

    #[test]
    fn test_set_record_display() {
        assert_eq!(SetRecord::new(50.0, 8).unwrap().to_string(), "50kg × 8");
        assert_eq!(SetRecord::new(0.0, 12).unwrap().to_string(), "12 reps");
    }

    #[test]
    fn test_workout_rejects_duplicate_exercise() {
        let exercises = vec![
            Exercise::new("squat", 3).unwrap(),
            Exercise::new("squat", 2).unwrap(),
        ];
        assert_eq!(
            Workout::new("legs", exercises, "anna"),
            Err(WorkoutError::DuplicateExercise("squat".to_string()))
        );
    }

    #[test]
    fn test_workout_rejects_empty() {
        assert!(matches!(
            Workout::new("legs", vec![], "anna"),
            Err(WorkoutError::NoExercises(_))
        ));
        assert_eq!(
            Workout::new("  ", vec![Exercise::new("squat", 1).unwrap()], "anna"),
            Err(WorkoutError::EmptyName)
        );
    }

    #[test]
    fn test_exercise_requires_target() {
        assert!(matches!(
            Exercise::new("squat", 0),
            Err(WorkoutError::InvalidTargetSets { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_invalid_set() {
        let err = serde_json::from_str::<SetRecord>(r#"{"weight":-5.0,"reps":0}"#).unwrap_err();
        assert!(err.to_string().contains("weight"));
        assert!(serde_json::from_str::<SetRecord>(r#"{"weight":50.0,"reps":0}"#).is_err());

        let set: SetRecord = serde_json::from_str(r#"{"weight":50.0,"reps":8}"#).unwrap();
        assert_eq!(set, SetRecord::new(50.0, 8).unwrap());
    }

    #[test]
    fn test_deserialize_rejects_invalid_workout() {
        let duplicate = r#"{"name":"legs","created_by":"anna","exercises":[
            {"name":"a","target_sets":1},{"name":"a","target_sets":2}]}"#;
        let err = serde_json::from_str::<Workout>(duplicate).unwrap_err();
        assert!(err.to_string().contains("duplicate exercise 'a'"));

        let no_target = r#"{"name":"legs","created_by":"anna","exercises":[
            {"name":"a","target_sets":0}]}"#;
        assert!(serde_json::from_str::<Workout>(no_target).is_err());

        let outcome = r#"{"name":"squat","targetSets":2,"recordedSets":[{"weight":50.0,"reps":0}]}"#;
        assert!(serde_json::from_str::<ExerciseOutcome>(outcome).is_err());
    }

    #[test]
    fn test_workout_json_round_trip_keeps_previous_sets() {
        let mut squat = Exercise::new("squat", 2).unwrap();
        squat.previous_sets = vec![SetRecord::new(45.0, 5).unwrap()];
        let workout = Workout::new("legs", vec![squat], "anna").unwrap();

        let json = serde_json::to_string(&workout).unwrap();
        assert_eq!(serde_json::from_str::<Workout>(&json).unwrap(), workout);
    }

    #[test]
    fn test_completed_session_boundary_shape() {
        let session = CompletedSession {
            id: Uuid::new_v4(),
            workout_name: "legs".to_string(),
            exercises: vec![ExerciseOutcome {
                name: "squat".to_string(),
                target_sets: 2,
                recorded_sets: vec![SetRecord::new(50.0, 5).unwrap()],
            }],
            started_at: Utc::now(),
            duration_ms: 1234,
            user: "anna".to_string(),
        };

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["workoutName"], "legs");
        assert_eq!(json["durationMs"], 1234);
        assert_eq!(json["user"], "anna");
        assert_eq!(json["exercises"][0]["targetSets"], 2);
        assert_eq!(json["exercises"][0]["recordedSets"][0]["weight"], 50.0);
        assert_eq!(json["exercises"][0]["recordedSets"][0]["reps"], 5);
    }
}
