//! Outbound notifications: speech, device commands and the operation log.
//!
//! Every announcement goes through [`Notifier::announce`], which always logs
//! and always forwards the device command. Speech is the only optional part.

mod command;
mod log;

use std::io::Write;

pub use command::{DeviceCommand, DevicePayload};
pub use log::{LogEntry, OperationLog, DEFAULT_LOG_CAPACITY};

use crate::error::DeviceError;
use crate::session::SystemStatus;

/// Text-to-speech engine.
pub trait SpeechOutput: Send {
    /// Speak `text`; with `interrupt` any utterance in flight is cancelled first.
    fn speak(&mut self, text: &str, interrupt: bool);
}

/// Send-only channel to the external board.
pub trait DeviceChannel: Send {
    fn send(&mut self, command: DeviceCommand) -> Result<(), DeviceError>;
}

/// Speech provider used when no synthesis engine is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeech;

impl SpeechOutput for NoSpeech {
    fn speak(&mut self, _text: &str, _interrupt: bool) {}
}

/// Device channel with no open connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedDevice;

impl DeviceChannel for DisconnectedDevice {
    fn send(&mut self, _command: DeviceCommand) -> Result<(), DeviceError> {
        Err(DeviceError::NotConnected)
    }
}

/// Writes one `{"command":n}` payload per line.
#[derive(Debug)]
pub struct JsonLineDevice<W> {
    out: W,
}

impl<W: Write + Send> JsonLineDevice<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DeviceChannel for JsonLineDevice<W> {
    fn send(&mut self, command: DeviceCommand) -> Result<(), DeviceError> {
        let line = serde_json::to_string(&DevicePayload::from(command))
            .map_err(|e| DeviceError::SendFailed(e.to_string()))?;
        writeln!(self.out, "{line}")
            .and_then(|_| self.out.flush())
            .map_err(|e| DeviceError::SendFailed(e.to_string()))
    }
}

/// Single ordered outlet for everything the session says or sends.
pub struct Notifier {
    speech: Box<dyn SpeechOutput>,
    device: Box<dyn DeviceChannel>,
    log: OperationLog,
    speech_enabled: bool,
}

impl Notifier {
    pub fn new(
        speech: Box<dyn SpeechOutput>,
        device: Box<dyn DeviceChannel>,
        speech_enabled: bool,
        log_capacity: usize,
    ) -> Self {
        Self {
            speech,
            device,
            log: OperationLog::new(log_capacity),
            speech_enabled,
        }
    }

    /// Log, speak (if enabled) and forward `command` to the board.
    pub fn announce(
        &mut self,
        status: SystemStatus,
        text: &str,
        command: DeviceCommand,
        interrupt: bool,
        now_ms: u64,
    ) {
        self.log.push(LogEntry::new(now_ms, status, command, text));
        tracing::info!(
            "announce [{}={}] {text}",
            command.key(),
            command.code()
        );
        if self.speech_enabled {
            self.speech.speak(text, interrupt);
        }
        self.send(command);
    }

    /// Forward a bare control command without speech or log entry.
    pub fn send(&mut self, command: DeviceCommand) {
        if let Err(e) = self.device.send(command) {
            tracing::warn!("device command {} not delivered: {e}", command.key());
        }
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech_enabled
    }

    pub fn set_speech_enabled(&mut self, enabled: bool) {
        self.speech_enabled = enabled;
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(
            Box::new(NoSpeech),
            Box::new(DisconnectedDevice),
            true,
            DEFAULT_LOG_CAPACITY,
        )
    }
}
