//! Workout session: orchestration, records and the event loop.

mod orchestrator;
mod replay;
mod report;
mod runner;
mod state;

pub use orchestrator::*;
pub use replay::{Replay, ScriptStep};
pub use report::{calories_burned, format_elapsed, met, WorkoutRecord};
pub use runner::SessionRunner;
pub use state::{ExerciseState, SystemStatus};

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::exercise::ExerciseType;
use crate::notify::{DeviceChannel, DisconnectedDevice, NoSpeech, SpeechOutput, DEFAULT_LOG_CAPACITY};
use crate::pose::Pose;
use crate::voice::{NoVoice, VoiceControl};

/// Where finished workouts go.
pub trait WorkoutHistory: Send {
    fn add_record(&mut self, record: &WorkoutRecord) -> Result<()>;
}

/// History sink that keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHistory;

impl WorkoutHistory for NoHistory {
    fn add_record(&mut self, _record: &WorkoutRecord) -> Result<()> {
        Ok(())
    }
}

/// External handles the orchestrator talks to. Defaults degrade every
/// modality to a no-op.
pub struct Collaborators {
    pub speech: Box<dyn SpeechOutput>,
    pub device: Box<dyn DeviceChannel>,
    pub voice: Box<dyn VoiceControl>,
    pub history: Box<dyn WorkoutHistory>,
    pub clock: Box<dyn Clock>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            speech: Box::new(NoSpeech),
            device: Box::new(DisconnectedDevice),
            voice: Box::new(NoVoice),
            history: Box::new(NoHistory),
            clock: Box::new(SystemClock),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub speech_enabled: bool,
    pub log_capacity: usize,
    pub weight_kg: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            speech_enabled: true,
            log_capacity: DEFAULT_LOG_CAPACITY,
            weight_kg: 70.0,
        }
    }
}

/// Pose frames and UI actions, in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SessionInput {
    DetectorReady,
    Frame {
        #[serde(default)]
        pose: Option<Pose>,
    },
    Confirm,
    Select {
        #[serde(default)]
        exercise: Option<ExerciseType>,
    },
    Start,
    Pause,
    Stop,
    CloseReport,
    Reset,
}
