//! Async event loop around the orchestrator.
//!
//! Inputs, voice events and the one-second tick are serialized through one
//! `select!`, so each handler finishes before the next one starts. The tick
//! phase restarts whenever the workout enters `Running`, so a second is only
//! counted after a full period of running time.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{ExerciseState, Orchestrator, SessionInput};
use crate::events::Event;
use crate::voice::VoiceEvent;

pub struct SessionRunner {
    orchestrator: Orchestrator,
    tick_period: Duration,
}

impl SessionRunner {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            tick_period: Duration::from_secs(1),
        }
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Run until the input channel closes; hands every drained event to
    /// `on_event` and returns the orchestrator for inspection.
    ///
    /// The voice channel may outlive the inputs: the orchestrator's own
    /// listener handle keeps its sender alive. A closed voice channel only
    /// silences that source.
    pub async fn run<F>(
        mut self,
        mut inputs: mpsc::Receiver<SessionInput>,
        mut voice: mpsc::UnboundedReceiver<VoiceEvent>,
        mut on_event: F,
    ) -> Orchestrator
    where
        F: FnMut(Event),
    {
        let mut ticker = interval_at(Instant::now() + self.tick_period, self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut voice_open = true;

        loop {
            let was_running = self.orchestrator.exercise_state() == ExerciseState::Running;
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => self.orchestrator.apply(input),
                    None => {
                        tracing::debug!("session input channel closed");
                        break;
                    }
                },
                event = voice.recv(), if voice_open => match event {
                    Some(event) => self.orchestrator.on_voice_event(event),
                    None => {
                        tracing::debug!("voice channel closed");
                        voice_open = false;
                    }
                },
                _ = ticker.tick() => self.orchestrator.tick(),
            }
            if !was_running && self.orchestrator.exercise_state() == ExerciseState::Running {
                ticker.reset();
            }
            for event in self.orchestrator.drain_events() {
                on_event(event);
            }
        }
        self.orchestrator
    }
}
