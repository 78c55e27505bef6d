//! Offline repetition counting over a recorded landmark stream.
//!
//! Input is JSON Lines, one frame per line:
//! `{"t_ms": 1700000000000, "pose": [{"x": 0.5, "y": 0.4, "visibility": 0.9}, ...]}`.
//! `pose` may be `null` for frames where nobody was detected.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use formcoach_core::{AnalyzerRegistry, ExerciseType, Pose, RepetitionEvent};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct Frame {
    t_ms: u64,
    pose: Option<Pose>,
}

#[derive(Serialize)]
struct Report {
    exercise: ExerciseType,
    frames: usize,
    empty_frames: usize,
    rep_count: u32,
    reps: Vec<RepetitionEvent>,
    /// How many frames carried each feedback string.
    feedback: BTreeMap<&'static str, u32>,
}

pub fn run(exercise: ExerciseType, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = BufReader::new(std::fs::File::open(file)?);
    let mut registry = AnalyzerRegistry::new();
    let analyzer = registry
        .get_mut(exercise)
        .ok_or_else(|| format!("no analyzer registered for {exercise}"))?;

    let mut report = Report {
        exercise,
        frames: 0,
        empty_frames: 0,
        rep_count: 0,
        reps: Vec::new(),
        feedback: BTreeMap::new(),
    };
    let mut started = false;

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: Frame =
            serde_json::from_str(&line).map_err(|e| format!("line {}: {e}", n + 1))?;
        report.frames += 1;
        if !started {
            analyzer.start(frame.t_ms);
            started = true;
        }
        let Some(pose) = frame.pose.filter(|p| !p.is_empty()) else {
            report.empty_frames += 1;
            continue;
        };

        let result = analyzer.analyze(&pose, frame.t_ms);
        report.rep_count = result.rep_count;
        report.reps.extend(result.new_rep);
        if !result.feedback.is_empty() {
            *report.feedback.entry(result.feedback).or_default() += 1;
        }
    }

    tracing::info!(
        "{} frames analyzed, {} repetitions",
        report.frames,
        report.rep_count
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
