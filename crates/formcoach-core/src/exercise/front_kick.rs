//! Front kick: right hip flexion, reported as kick height `180 - hip angle`.

use super::tracker::{Extremum, RepTracker};
use super::{
    round_to, AnalysisResult, Analyzer, ExerciseType, Stage, FEEDBACK_KICK_HIGHER,
    FEEDBACK_REP_COMPLETE,
};
use crate::pose::{angle_at, Pose, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER};

/// Hip closed past this angle -> kick.
const HIP_KICK_THRESHOLD: f64 = 140.0;
/// Hip opened past this angle -> down, repetition counted.
const HIP_DOWN_THRESHOLD: f64 = 170.0;
/// While kicking, a hip above this angle is too low a kick.
const HIP_HEIGHT_TARGET: f64 = 150.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FrontKickAnalyzer {
    tracker: RepTracker,
}

impl FrontKickAnalyzer {
    pub const fn new() -> Self {
        Self {
            tracker: RepTracker::new(Extremum::Max, 0.0),
        }
    }
}

impl Default for FrontKickAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for FrontKickAnalyzer {
    fn exercise(&self) -> ExerciseType {
        ExerciseType::FrontKick
    }

    fn start(&mut self, now_ms: u64) {
        self.tracker.start(now_ms);
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }

    fn analyze(&mut self, pose: &Pose, now_ms: u64) -> AnalysisResult {
        let hip = pose
            .select([RIGHT_SHOULDER, RIGHT_HIP, RIGHT_KNEE])
            .and_then(|[s, h, k]| angle_at(&s, &h, &k));
        let Some(hip) = hip else {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        };

        let mut feedback = "";
        let mut new_rep = None;

        self.tracker.track(180.0 - hip);

        if !self.tracker.is_active() && hip < HIP_KICK_THRESHOLD {
            self.tracker.enter();
        } else if self.tracker.is_active() && hip > HIP_DOWN_THRESHOLD {
            let mut rep = self.tracker.complete(now_ms);
            rep.range_of_motion = round_to(rep.range_of_motion, 1);
            tracing::info!(
                "front kick rep {} completed: height {}°, tempo {}s",
                self.tracker.rep_count(),
                rep.range_of_motion,
                rep.tempo
            );
            new_rep = Some(rep);
            feedback = FEEDBACK_REP_COMPLETE;
        }

        if self.tracker.is_active() && hip > HIP_HEIGHT_TARGET {
            feedback = FEEDBACK_KICK_HIGHER;
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
            Stage::Kick
        } else {
            Stage::Down
        }
    }
}
