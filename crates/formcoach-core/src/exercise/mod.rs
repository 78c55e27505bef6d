//! Exercise analyzers.
//!
//! Every exercise is a two-stage repetition state machine with asymmetric
//! hysteresis: the threshold to enter the active stage is stricter than the
//! threshold to return to rest, so a joint hovering near one boundary cannot
//! double count. The shared bookkeeping (rep count, extremum, tempo) lives in
//! [`tracker`]; each exercise module only measures and compares.
//!
//! ## Usage
//!
//! ```ignore
//! let mut registry = AnalyzerRegistry::new();
//! let squat = registry.get_mut(ExerciseType::Squat).unwrap();
//! squat.reset();
//! squat.start(now_ms);
//! // Per frame:
//! let result = squat.analyze(&pose, now_ms);
//! ```

mod bicep_curl;
mod front_kick;
mod jumping_jack;
mod lateral_raise;
mod lunge;
mod overhead_press;
mod registry;
mod squat;
mod tracker;

pub use bicep_curl::BicepCurlAnalyzer;
pub use front_kick::FrontKickAnalyzer;
pub use jumping_jack::JumpingJackAnalyzer;
pub use lateral_raise::LateralRaiseAnalyzer;
pub use lunge::LungeAnalyzer;
pub use overhead_press::OverheadPressAnalyzer;
pub use registry::AnalyzerRegistry;
pub use squat::SquatAnalyzer;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pose::Pose;

// Feedback literals double as lookup keys for spoken cues, keep them verbatim.

/// Emitted on the frame a repetition completes.
pub const FEEDBACK_REP_COMPLETE: &str = "完成一次！";
/// Squat: hip dropped below knee while down.
pub const FEEDBACK_SQUAT_DEEPER: &str = "蹲得再深一点！";
/// Lunge: a knee still above 120° while down.
pub const FEEDBACK_LUNGE_DEEPER: &str = "下蹲再深一些！";
/// Front kick: hip still above 150° while kicking.
pub const FEEDBACK_KICK_HIGHER: &str = "踢得再高一点！";
/// Jumping jack: open stage reached.
pub const FEEDBACK_JACK_OPEN: &str = "动作到位！";

/// Identifier of a supported exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Squat,
    BicepCurl,
    LateralRaise,
    OverheadPress,
    JumpingJack,
    Lunge,
    FrontKick,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 7] = [
        ExerciseType::Squat,
        ExerciseType::BicepCurl,
        ExerciseType::LateralRaise,
        ExerciseType::OverheadPress,
        ExerciseType::JumpingJack,
        ExerciseType::Lunge,
        ExerciseType::FrontKick,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseType::Squat => "squat",
            ExerciseType::BicepCurl => "bicep_curl",
            ExerciseType::LateralRaise => "lateral_raise",
            ExerciseType::OverheadPress => "overhead_press",
            ExerciseType::JumpingJack => "jumping_jack",
            ExerciseType::Lunge => "lunge",
            ExerciseType::FrontKick => "front_kick",
        }
    }

    /// Name used in spoken announcements.
    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseType::Squat => "深蹲",
            ExerciseType::BicepCurl => "二头弯举",
            ExerciseType::LateralRaise => "侧平举",
            ExerciseType::OverheadPress => "过头推举",
            ExerciseType::JumpingJack => "开合跳",
            ExerciseType::Lunge => "弓步",
            ExerciseType::FrontKick => "前踢腿",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExerciseType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown exercise: {s}"))
    }
}

/// Phase of one repetition cycle. Each exercise uses exactly two of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Up,
    Down,
    Open,
    Closed,
    Kick,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Up => "up",
            Stage::Down => "down",
            Stage::Open => "open",
            Stage::Closed => "closed",
            Stage::Kick => "kick",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics for one completed repetition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepetitionEvent {
    /// Completion time, ms since epoch.
    pub timestamp_ms: u64,
    /// Best depth/height reached; unit depends on the exercise.
    pub range_of_motion: f64,
    /// Seconds since the previous repetition, 0 for the first one.
    pub tempo: f64,
}

/// Outcome of feeding one frame to an analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub rep_count: u32,
    /// Empty when there is nothing to say this frame.
    pub feedback: &'static str,
    pub stage: Stage,
    /// Present only on the frame where a repetition completes.
    pub new_rep: Option<RepetitionEvent>,
}

impl AnalysisResult {
    /// Result for a frame that carried no usable measurement.
    pub(crate) fn skipped(rep_count: u32, stage: Stage) -> Self {
        Self {
            rep_count,
            feedback: "",
            stage,
            new_rep: None,
        }
    }
}

/// Capability shared by all exercise analyzers.
///
/// Instances are long-lived and reused across sessions; `reset` must bring
/// an analyzer back to exactly its freshly-constructed state.
pub trait Analyzer: Send {
    fn exercise(&self) -> ExerciseType;

    /// Stamp the repetition-timer origin. Does not touch counts.
    fn start(&mut self, now_ms: u64);

    fn reset(&mut self);

    /// Advance the state machine by one frame.
    ///
    /// Frames with missing landmarks or degenerate geometry are skipped:
    /// state is left untouched and the result carries no feedback.
    fn analyze(&mut self, pose: &Pose, now_ms: u64) -> AnalysisResult;

    fn rep_count(&self) -> u32;

    fn stage(&self) -> Stage;
}

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_type_parses_its_own_name() {
        for t in ExerciseType::ALL {
            assert_eq!(t.as_str().parse::<ExerciseType>().unwrap(), t);
        }
        assert!("burpee".parse::<ExerciseType>().is_err());
    }

    #[test]
    fn exercise_type_serializes_snake_case() {
        let json = serde_json::to_string(&ExerciseType::OverheadPress).unwrap();
        assert_eq!(json, "\"overhead_press\"");
    }

    #[test]
    fn round_to_two_decimals() {
        assert_eq!(round_to(1.234_9, 2), 1.23);
        assert_eq!(round_to(1.235_1, 2), 1.24);
        assert_eq!(round_to(84.96, 1), 85.0);
    }
}
