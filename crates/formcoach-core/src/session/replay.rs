//! Deterministic, synchronous session driver.
//!
//! Runs a script of inputs against an orchestrator on a manual clock, with
//! voice routed through a real [`VoiceListener`] so the listener lifecycle
//! (late results after a deliberate stop, restarts) behaves as it would live.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::{Collaborators, Orchestrator, SessionInput, SessionSettings};
use crate::clock::ManualClock;
use crate::events::Event;
use crate::voice::{EngineEvent, LoopbackRecognizer, VoiceEvent, VoiceListener};

/// One line of a session script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    /// Utterance delivered by the recognizer.
    Voice { voice: String },
    /// Let wall time pass without a tick.
    Wait { wait_ms: u64 },
    /// Whole seconds of running time.
    Tick { ticks: u32 },
    Input(SessionInput),
}

pub struct Replay {
    orchestrator: Orchestrator,
    clock: ManualClock,
    listener: VoiceListener<LoopbackRecognizer>,
    utterances: mpsc::UnboundedSender<EngineEvent>,
    engine_events: mpsc::UnboundedReceiver<EngineEvent>,
    voice_events: mpsc::UnboundedReceiver<VoiceEvent>,
    events: Vec<Event>,
}

impl Replay {
    /// `collaborators.voice` and `collaborators.clock` are replaced by the
    /// replay's own listener and manual clock.
    pub fn new(mut collaborators: Collaborators, settings: SessionSettings, start_ms: u64) -> Self {
        let clock = ManualClock::new(start_ms);
        let (engine, utterances, engine_events) = LoopbackRecognizer::new();
        let (listener, voice_events) = VoiceListener::new(engine);
        collaborators.voice = Box::new(listener.clone());
        collaborators.clock = Box::new(clock.clone());
        Self {
            orchestrator: Orchestrator::new(collaborators, settings),
            clock,
            listener,
            utterances,
            engine_events,
            voice_events,
            events: Vec::new(),
        }
    }

    pub fn step(&mut self, step: ScriptStep) {
        match step {
            ScriptStep::Voice { voice } => {
                let _ = self.utterances.send(EngineEvent::Result(voice));
            }
            ScriptStep::Wait { wait_ms } => self.clock.advance(wait_ms),
            ScriptStep::Tick { ticks } => {
                for _ in 0..ticks {
                    self.clock.advance(1_000);
                    self.orchestrator.tick();
                }
            }
            ScriptStep::Input(input) => self.orchestrator.apply(input),
        }
        self.settle();
        self.events.extend(self.orchestrator.drain_events());
    }

    pub fn run(&mut self, steps: impl IntoIterator<Item = ScriptStep>) {
        for step in steps {
            self.step(step);
        }
    }

    /// Deliver everything the recognizer and listener have queued.
    fn settle(&mut self) {
        loop {
            let mut progressed = false;
            while let Ok(event) = self.engine_events.try_recv() {
                self.listener.handle_engine_event(event);
                progressed = true;
            }
            while let Ok(event) = self.voice_events.try_recv() {
                self.orchestrator.on_voice_event(event);
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_listening()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn into_orchestrator(self) -> Orchestrator {
        self.orchestrator
    }
}
