//! Speech-recognition lifecycle.
//!
//! The raw engine reports what it is doing through [`EngineEvent`]s. The
//! listener turns those into [`VoiceEvent`]s on a single-consumer channel.
//! It restarts the engine after an unexpected stop. After a deliberate stop
//! it drops anything the engine delivers, including a late `Started` from a
//! start that was still pending when the stop came in.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use super::{VoiceControl, VoiceEvent, VoiceStatus};
use crate::error::VoiceError;

/// Raw continuous speech-recognition engine.
pub trait Recognizer: Send {
    fn start(&mut self) -> Result<(), VoiceError>;
    fn stop(&mut self);
}

/// What the engine reports back, in the order it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Started,
    Result(String),
    Ended,
    Error(String),
}

struct Inner<R> {
    engine: R,
    /// The engine has reported `Started` and no stop was requested since.
    listening: bool,
    /// Recognition was requested and not stopped since, whether or not the
    /// engine has come up yet.
    wanted: bool,
    events: mpsc::UnboundedSender<VoiceEvent>,
}

impl<R: Recognizer> Inner<R> {
    fn emit(&self, event: VoiceEvent) {
        // A closed receiver means the session is gone; nothing left to tell.
        let _ = self.events.send(event);
    }

    fn start(&mut self) {
        self.wanted = true;
        if self.listening {
            tracing::debug!("voice listener already running");
            return;
        }
        match self.engine.start() {
            Ok(()) => {}
            Err(VoiceError::AlreadyStarting) => {
                tracing::debug!("recognizer already starting, waiting for it to settle");
            }
            Err(e) => tracing::warn!("voice recognition failed to start: {e}"),
        }
    }
}

/// Shared handle; clones drive the same engine.
pub struct VoiceListener<R> {
    inner: Arc<Mutex<Inner<R>>>,
}

impl<R> Clone for VoiceListener<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Recognizer> VoiceListener<R> {
    pub fn new(engine: R) -> (Self, mpsc::UnboundedReceiver<VoiceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = Self {
            inner: Arc::new(Mutex::new(Inner {
                engine,
                listening: false,
                wanted: false,
                events: tx,
            })),
        };
        (listener, rx)
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_listening(&self) -> bool {
        self.lock().listening
    }

    pub fn handle_engine_event(&self, event: EngineEvent) {
        let mut inner = self.lock();
        match event {
            EngineEvent::Started if !inner.wanted => {
                tracing::debug!("recognizer came up after a stop request, stopping it");
                inner.engine.stop();
            }
            EngineEvent::Started => {
                inner.listening = true;
                inner.emit(VoiceEvent::Status(VoiceStatus::Listening));
            }
            EngineEvent::Result(text) => {
                if inner.listening {
                    inner.emit(VoiceEvent::Command(text.trim().to_string()));
                } else {
                    tracing::debug!("dropping late recognition result {text:?}");
                }
            }
            EngineEvent::Ended => {
                let unexpected = inner.wanted;
                inner.listening = false;
                inner.emit(VoiceEvent::Status(VoiceStatus::Stopped));
                if unexpected {
                    tracing::warn!("voice recognition stopped unexpectedly, restarting");
                    inner.start();
                }
            }
            EngineEvent::Error(message) => {
                tracing::warn!("voice recognition error: {message}");
                inner.emit(VoiceEvent::Status(VoiceStatus::Error));
            }
        }
    }

    /// Feed engine events until the engine side hangs up.
    pub async fn pump(self, mut engine_events: mpsc::UnboundedReceiver<EngineEvent>) {
        while let Some(event) = engine_events.recv().await {
            self.handle_engine_event(event);
        }
    }
}

impl<R: Recognizer> VoiceControl for VoiceListener<R> {
    fn start_listening(&mut self) {
        self.lock().start();
    }

    fn stop_listening(&mut self) {
        let mut inner = self.lock();
        if !inner.wanted && !inner.listening {
            return;
        }
        inner.wanted = false;
        inner.listening = false;
        inner.engine.stop();
    }
}

/// Engine that reports its own lifecycle over a channel and takes
/// utterances from whoever holds the sender. Used for line-fed sessions.
#[derive(Debug, Clone)]
pub struct LoopbackRecognizer {
    events: mpsc::UnboundedSender<EngineEvent>,
    running: bool,
}

impl LoopbackRecognizer {
    pub fn new() -> (Self, mpsc::UnboundedSender<EngineEvent>, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Self {
            events: tx.clone(),
            running: false,
        };
        (engine, tx, rx)
    }
}

impl Recognizer for LoopbackRecognizer {
    fn start(&mut self) -> Result<(), VoiceError> {
        if self.running {
            return Err(VoiceError::AlreadyStarting);
        }
        self.running = true;
        self.events
            .send(EngineEvent::Started)
            .map_err(|e| VoiceError::StartFailed(e.to_string()))
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            let _ = self.events.send(EngineEvent::Ended);
        }
    }
}
