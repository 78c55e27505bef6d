//! # FormCoach Core Library
//!
//! Real-time repetition counting and form feedback from 2D body landmarks,
//! plus the session orchestrator that walks a user from calibration to a
//! finished workout. The `formcoach` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Pose**: landmark model, joint-angle geometry and the ready-pose gate
//! - **Exercise**: seven two-stage rep-counting analyzers behind one trait,
//!   looked up through a fixed registry
//! - **Session**: the orchestrator state machines, workout records, a tokio
//!   event loop and a deterministic script replay
//! - **Notify / Voice**: outbound speech and device commands with an
//!   operation log; voice-command interpretation and recognizer lifecycle
//! - **Storage**: SQLite workout history and profile, TOML configuration
//!
//! ## Key Components
//!
//! - [`Analyzer`]: per-exercise repetition state machine
//! - [`Orchestrator`]: session state owner; caller drives it with inputs,
//!   voice events and one-second ticks
//! - [`Database`]: workout history and user profile
//! - [`Config`]: application configuration

pub mod clock;
pub mod error;
pub mod events;
pub mod exercise;
pub mod notify;
pub mod pose;
pub mod session;
pub mod storage;
pub mod voice;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, DeviceError, VoiceError};
pub use events::Event;
pub use exercise::{
    AnalysisResult, Analyzer, AnalyzerRegistry, ExerciseType, RepetitionEvent, Stage,
};
pub use notify::{DeviceChannel, DeviceCommand, JsonLineDevice, LogEntry, SpeechOutput};
pub use pose::{Landmark, Pose};
pub use session::{
    Collaborators, ExerciseState, Orchestrator, Replay, ScriptStep, SessionInput, SessionRunner,
    SessionSettings, SystemStatus, WorkoutHistory, WorkoutRecord,
};
pub use storage::{Config, Database, UserProfile};
pub use voice::{VoiceControl, VoiceEvent, VoiceListener, VoiceStatus};
