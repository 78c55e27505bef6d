//! Coaching sessions from the command line.
//!
//! Both modes read JSON Lines steps:
//!
//! ```text
//! {"step":"detector_ready"}
//! {"step":"frame","pose":[{"x":0.5,"y":0.4,"visibility":0.9}, ...]}
//! {"voice":"开始深蹲"}
//! {"wait_ms":1500}
//! {"ticks":30}
//! {"step":"stop"}
//! ```
//!
//! Session events are printed to stdout one JSON object per line, followed by
//! a final `SessionSummary` line. `wait_ms` and `ticks` only make sense in a
//! replay; a live session takes its time from the wall clock.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::Subcommand;
use formcoach_core::notify::{DisconnectedDevice, NoSpeech};
use formcoach_core::session::NoHistory;
use formcoach_core::voice::{EngineEvent, LoopbackRecognizer};
use formcoach_core::{
    Collaborators, Config, Database, DeviceChannel, Event, JsonLineDevice, Orchestrator, Replay,
    ScriptStep, SessionRunner, SessionSettings, SpeechOutput, VoiceListener,
};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Replay a scripted session on a simulated clock
    Replay {
        /// JSONL script file
        script: PathBuf,
        /// Write device payloads to this file ("-" for stdout)
        #[arg(long)]
        device: Option<PathBuf>,
        /// Do not store the finished workout
        #[arg(long)]
        no_save: bool,
        /// Simulated clock start, ms since epoch
        #[arg(long, default_value = "0")]
        start_ms: u64,
    },
    /// Live session: steps arrive on stdin, ticks come from the wall clock
    Run {
        /// Write device payloads to this file ("-" for stdout)
        #[arg(long)]
        device: Option<PathBuf>,
        /// Do not store the finished workout
        #[arg(long)]
        no_save: bool,
    },
}

/// Prints what would be spoken.
struct TerminalSpeech {
    rate: f64,
    volume: f64,
}

impl SpeechOutput for TerminalSpeech {
    fn speak(&mut self, text: &str, interrupt: bool) {
        tracing::debug!(
            rate = self.rate,
            volume = self.volume,
            interrupt,
            "speaking"
        );
        eprintln!("[speech] {text}");
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        SessionAction::Replay {
            script,
            device,
            no_save,
            start_ms,
        } => replay(&config, &script, device.as_deref(), no_save, start_ms),
        SessionAction::Run { device, no_save } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(live(&config, device.as_deref(), no_save))
        }
    }
}

/// Collaborators and settings shared by both modes. Voice and clock are
/// filled in by the caller.
fn setup(
    config: &Config,
    device: Option<&Path>,
    no_save: bool,
) -> Result<(Collaborators, SessionSettings), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let settings = config.session_settings(db.profile()?.weight_kg);

    let speech: Box<dyn SpeechOutput> = if config.speech.enabled {
        Box::new(TerminalSpeech {
            rate: config.speech.rate,
            volume: config.speech.volume,
        })
    } else {
        Box::new(NoSpeech)
    };
    let device: Box<dyn DeviceChannel> = match device {
        Some(path) if path == Path::new("-") => Box::new(JsonLineDevice::new(std::io::stdout())),
        Some(path) => Box::new(JsonLineDevice::new(std::fs::File::create(path)?)),
        None => Box::new(DisconnectedDevice),
    };
    let collaborators = Collaborators {
        speech,
        device,
        history: if no_save {
            Box::new(NoHistory)
        } else {
            Box::new(db)
        },
        ..Collaborators::default()
    };
    Ok((collaborators, settings))
}

fn replay(
    config: &Config,
    script: &Path,
    device: Option<&Path>,
    no_save: bool,
    start_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let reader = BufReader::new(std::fs::File::open(script)?);
    let mut steps = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let step: ScriptStep =
            serde_json::from_str(&line).map_err(|e| format!("line {}: {e}", n + 1))?;
        steps.push(step);
    }

    let (collaborators, settings) = setup(config, device, no_save)?;
    let mut replay = Replay::new(collaborators, settings, start_ms);
    for step in steps {
        if matches!(step, ScriptStep::Voice { .. }) && !config.voice.enabled {
            tracing::warn!("voice step skipped: voice commands are disabled");
            continue;
        }
        replay.step(step);
        for event in replay.take_events() {
            emit(&event)?;
        }
    }
    print_summary(replay.orchestrator())
}

async fn live(
    config: &Config,
    device: Option<&Path>,
    no_save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut collaborators, settings) = setup(config, device, no_save)?;

    let (engine, utterances, engine_events) = LoopbackRecognizer::new();
    let (listener, voice_events) = VoiceListener::new(engine);
    if config.voice.enabled {
        collaborators.voice = Box::new(listener.clone());
    }
    let pump = tokio::spawn(listener.pump(engine_events));

    let (inputs, inputs_rx) = mpsc::channel(64);
    let runner = SessionRunner::new(Orchestrator::new(collaborators, settings));
    let session = tokio::spawn(runner.run(inputs_rx, voice_events, |event| {
        if let Err(e) = emit(&event) {
            tracing::warn!("failed to print event: {e}");
        }
    }));

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let step: ScriptStep = match serde_json::from_str(&line) {
            Ok(step) => step,
            Err(e) => {
                tracing::warn!("skipping unreadable step {line:?}: {e}");
                continue;
            }
        };
        match step {
            ScriptStep::Voice { voice } if config.voice.enabled => {
                let _ = utterances.send(EngineEvent::Result(voice));
            }
            ScriptStep::Voice { .. } => {
                tracing::warn!("voice step skipped: voice commands are disabled");
            }
            ScriptStep::Input(input) => {
                if inputs.send(input).await.is_err() {
                    break;
                }
            }
            ScriptStep::Wait { .. } | ScriptStep::Tick { .. } => {
                tracing::warn!("{line} ignored: a live session runs on the wall clock");
            }
        }
    }

    drop(inputs);
    let orchestrator = session.await?;
    pump.abort();
    print_summary(&orchestrator)
}

fn emit(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn print_summary(orchestrator: &Orchestrator) -> Result<(), Box<dyn std::error::Error>> {
    let summary = serde_json::json!({
        "type": "SessionSummary",
        "status": orchestrator.status(),
        "exercise_state": orchestrator.exercise_state(),
        "exercise": orchestrator.current_exercise(),
        "rep_count": orchestrator.rep_count(),
        "elapsed": orchestrator.formatted_elapsed(),
        "calories": orchestrator.calories(),
        "record": orchestrator.summary(),
        "log": orchestrator.log().entries().collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
