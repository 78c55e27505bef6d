//! Squat: both knee angles, min-angle depth.

use super::tracker::{Extremum, RepTracker};
use super::{
    AnalysisResult, Analyzer, ExerciseType, Stage, FEEDBACK_REP_COMPLETE, FEEDBACK_SQUAT_DEEPER,
};
use crate::pose::{
    angle_at, Pose, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE,
};

/// Both knees below this angle -> down.
const KNEE_DOWN_THRESHOLD: f64 = 90.0;
/// Both knees above this angle -> up, repetition counted.
const KNEE_UP_THRESHOLD: f64 = 165.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SquatAnalyzer {
    tracker: RepTracker,
}

impl SquatAnalyzer {
    pub const fn new() -> Self {
        Self {
            tracker: RepTracker::new(Extremum::Min, 180.0),
        }
    }
}

impl Default for SquatAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for SquatAnalyzer {
    fn exercise(&self) -> ExerciseType {
        ExerciseType::Squat
    }

    fn start(&mut self, now_ms: u64) {
        self.tracker.start(now_ms);
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }

    fn analyze(&mut self, pose: &Pose, now_ms: u64) -> AnalysisResult {
        let Some([lh, rh, lk, rk, la, ra]) =
            pose.select([LEFT_HIP, RIGHT_HIP, LEFT_KNEE, RIGHT_KNEE, LEFT_ANKLE, RIGHT_ANKLE])
        else {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        };
        let (Some(left), Some(right)) = (angle_at(&lh, &lk, &la), angle_at(&rh, &rk, &ra)) else {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        };

        let mut feedback = "";
        let mut new_rep = None;

        self.tracker.track(left.min(right));

        if !self.tracker.is_active() && left < KNEE_DOWN_THRESHOLD && right < KNEE_DOWN_THRESHOLD {
            self.tracker.enter();
        } else if self.tracker.is_active() && left > KNEE_UP_THRESHOLD && right > KNEE_UP_THRESHOLD
        {
            let rep = self.tracker.complete(now_ms);
            tracing::info!(
                "squat rep {} completed: depth {:.1}°, tempo {}s",
                self.tracker.rep_count(),
                rep.range_of_motion,
                rep.tempo
            );
            new_rep = Some(rep);
            feedback = FEEDBACK_REP_COMPLETE;
        }

        if self.tracker.is_active() && (lh.y > lk.y || rh.y > rk.y) {
            feedback = FEEDBACK_SQUAT_DEEPER;
        }

        AnalysisResult {
            rep_count: self.tracker.rep_count(),
            feedback,
            stage: self.stage(),
            new_rep,
        }
    }

    fn rep_count(&self) -> u32 {
        self.tracker.rep_count()
    }

    fn stage(&self) -> Stage {
        if self.tracker.is_active() {
            Stage::Down
        } else {
            Stage::Up
        }
    }
}
