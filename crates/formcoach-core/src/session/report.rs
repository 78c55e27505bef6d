//! Finished-workout records and the numbers that go into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exercise::{round_to, ExerciseType, RepetitionEvent};

/// Snapshot of one finished workout. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    pub exercise: ExerciseType,
    pub ended_at: DateTime<Utc>,
    pub total_reps: u32,
    pub total_secs: u64,
    pub total_calories: f64,
    pub rep_details: Vec<RepetitionEvent>,
}

impl WorkoutRecord {
    pub fn formatted_time(&self) -> String {
        format_elapsed(self.total_secs)
    }
}

/// Metabolic equivalent per exercise.
pub fn met(exercise: ExerciseType) -> f64 {
    match exercise {
        ExerciseType::Squat => 5.0,
        ExerciseType::BicepCurl => 3.5,
        ExerciseType::LateralRaise => 3.5,
        ExerciseType::OverheadPress => 4.0,
        ExerciseType::JumpingJack => 8.0,
        ExerciseType::Lunge => 4.5,
        ExerciseType::FrontKick => 4.0,
    }
}

/// kcal = MET x body weight (kg) x hours, to one decimal.
pub fn calories_burned(exercise: ExerciseType, weight_kg: f64, elapsed_secs: u64) -> f64 {
    let hours = elapsed_secs as f64 / 3600.0;
    round_to(met(exercise) * weight_kg * hours, 1)
}

/// `HH:MM:SS`; hours are not wrapped.
pub fn format_elapsed(secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
