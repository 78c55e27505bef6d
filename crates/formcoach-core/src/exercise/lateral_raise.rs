//! Lateral raise: hip-shoulder-elbow angle on both sides, max-angle height.

use super::tracker::{Extremum, RepTracker};
use super::{AnalysisResult, Analyzer, ExerciseType, Stage, FEEDBACK_REP_COMPLETE};
use crate::pose::{
    angle_at, Pose, LEFT_ELBOW, LEFT_HIP, LEFT_SHOULDER, RIGHT_ELBOW, RIGHT_HIP, RIGHT_SHOULDER,
};

/// Both arms above this angle -> up.
const ARM_UP_THRESHOLD: f64 = 75.0;
/// Both arms below this angle -> down, repetition counted.
const ARM_DOWN_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LateralRaiseAnalyzer {
    tracker: RepTracker,
}

impl LateralRaiseAnalyzer {
    pub const fn new() -> Self {
        Self {
            tracker: RepTracker::new(Extremum::Max, 0.0),
        }
    }
}

impl Default for LateralRaiseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for LateralRaiseAnalyzer {
    fn exercise(&self) -> ExerciseType {
        ExerciseType::LateralRaise
    }

    fn start(&mut self, now_ms: u64) {
        self.tracker.start(now_ms);
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }

    fn analyze(&mut self, pose: &Pose, now_ms: u64) -> AnalysisResult {
        let angles = pose
            .select([LEFT_HIP, LEFT_SHOULDER, LEFT_ELBOW, RIGHT_HIP, RIGHT_SHOULDER, RIGHT_ELBOW])
            .and_then(|[lh, ls, le, rh, rs, re]| {
                Some((angle_at(&lh, &ls, &le)?, angle_at(&rh, &rs, &re)?))
            });
        let Some((left, right)) = angles else {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        };

        let mut feedback = "";
        let mut new_rep = None;

        self.tracker.track(left.max(right));

        if !self.tracker.is_active() && left > ARM_UP_THRESHOLD && right > ARM_UP_THRESHOLD {
            self.tracker.enter();
        } else if self.tracker.is_active() && left < ARM_DOWN_THRESHOLD && right < ARM_DOWN_THRESHOLD
        {
            let rep = self.tracker.complete(now_ms);
            tracing::info!(
                "lateral raise rep {} completed: height {:.1}°, tempo {}s",
                self.tracker.rep_count(),
                rep.range_of_motion,
                rep.tempo
            );
            new_rep = Some(rep);
            feedback = FEEDBACK_REP_COMPLETE;
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
            Stage::Up
        } else {
            Stage::Down
        }
    }
}
