use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exercise::{ExerciseType, RepetitionEvent};
use crate::session::{SystemStatus, WorkoutRecord};

/// Every state change in a session produces an Event.
/// Callers drain them from the orchestrator after each input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StatusChanged {
        from: SystemStatus,
        to: SystemStatus,
        at: DateTime<Utc>,
    },
    WorkoutSelected {
        exercise: Option<ExerciseType>,
        at: DateTime<Utc>,
    },
    WorkoutStarted {
        exercise: ExerciseType,
        /// True when continuing a paused workout.
        resumed: bool,
        at: DateTime<Utc>,
    },
    WorkoutPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    RepCompleted {
        exercise: ExerciseType,
        rep_count: u32,
        rep: RepetitionEvent,
        at: DateTime<Utc>,
    },
    WorkoutFinished {
        record: WorkoutRecord,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::StatusChanged { at, .. }
            | Self::WorkoutSelected { at, .. }
            | Self::WorkoutStarted { at, .. }
            | Self::WorkoutPaused { at, .. }
            | Self::RepCompleted { at, .. }
            | Self::WorkoutFinished { at, .. }
            | Self::SessionReset { at } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::StatusChanged {
            from: SystemStatus::Searching,
            to: SystemStatus::WaitingConfirmation,
            at: DateTime::from_timestamp_millis(0).unwrap(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StatusChanged");
        assert_eq!(json["to"], "waiting_confirmation");
        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
