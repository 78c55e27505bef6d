//! Voice control: command interpretation and the recognizer lifecycle.

mod command;
mod listener;

use serde::{Deserialize, Serialize};

pub use command::{
    interpret, normalize, selection_phrases, VoiceIntent, CONFIRM_PHRASES, PAUSE_PHRASES,
    RESUME_PHRASES, START_PHRASES, STOP_PHRASES,
};
pub use listener::{EngineEvent, LoopbackRecognizer, Recognizer, VoiceListener};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStatus {
    Listening,
    Processing,
    Stopped,
    Error,
    #[default]
    Inactive,
}

/// What the voice subsystem hands to the session, one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VoiceEvent {
    Command(String),
    Status(VoiceStatus),
}

/// Start/stop handle the orchestrator holds on the voice subsystem.
pub trait VoiceControl: Send {
    fn start_listening(&mut self);
    /// Deliberate stop. Must be idempotent.
    fn stop_listening(&mut self);
}

/// Voice provider used when recognition is unavailable or disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVoice;

impl VoiceControl for NoVoice {
    fn start_listening(&mut self) {}
    fn stop_listening(&mut self) {}
}
