//! Lunge: both knee angles, min-angle depth.

use super::tracker::{Extremum, RepTracker};
use super::{
    AnalysisResult, Analyzer, ExerciseType, Stage, FEEDBACK_LUNGE_DEEPER, FEEDBACK_REP_COMPLETE,
};
use crate::pose::{
    angle_at, Pose, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, RIGHT_ANKLE, RIGHT_HIP,
    RIGHT_KNEE, RIGHT_SHOULDER,
};

const KNEE_DOWN_THRESHOLD: f64 = 110.0;
const KNEE_UP_THRESHOLD: f64 = 160.0;
/// While down, a knee above this angle is not deep enough.
const KNEE_DEPTH_TARGET: f64 = 120.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LungeAnalyzer {
    knee: RepTracker,
    /// Minimum hip angle this repetition. Tracked alongside the knee but not
    /// reported.
    min_hip_angle: f64,
}

impl LungeAnalyzer {
    pub const fn new() -> Self {
        Self {
            knee: RepTracker::new(Extremum::Min, 180.0),
            min_hip_angle: 180.0,
        }
    }

    pub fn min_hip_angle(&self) -> f64 {
        self.min_hip_angle
    }
}

impl Default for LungeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for LungeAnalyzer {
    fn exercise(&self) -> ExerciseType {
        ExerciseType::Lunge
    }

    fn start(&mut self, now_ms: u64) {
        self.knee.start(now_ms);
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn analyze(&mut self, pose: &Pose, now_ms: u64) -> AnalysisResult {
        let angles = pose
            .select([
                LEFT_SHOULDER,
                RIGHT_SHOULDER,
                LEFT_HIP,
                RIGHT_HIP,
                LEFT_KNEE,
                RIGHT_KNEE,
                LEFT_ANKLE,
                RIGHT_ANKLE,
            ])
            .and_then(|[ls, rs, lh, rh, lk, rk, la, ra]| {
                Some((
                    angle_at(&lh, &lk, &la)?,
                    angle_at(&rh, &rk, &ra)?,
                    angle_at(&ls, &lh, &lk)?,
                    angle_at(&rs, &rh, &rk)?,
                ))
            });
        let Some((left_knee, right_knee, left_hip, right_hip)) = angles else {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        };

        let mut feedback = "";
        let mut new_rep = None;

        if self.knee.is_active() {
            self.min_hip_angle = self.min_hip_angle.min(left_hip).min(right_hip);
        }
        self.knee.track(left_knee.min(right_knee));

        if !self.knee.is_active()
            && left_knee < KNEE_DOWN_THRESHOLD
            && right_knee < KNEE_DOWN_THRESHOLD
        {
            self.knee.enter();
            self.min_hip_angle = 180.0;
        } else if self.knee.is_active()
            && left_knee > KNEE_UP_THRESHOLD
            && right_knee > KNEE_UP_THRESHOLD
        {
            let rep = self.knee.complete(now_ms);
            tracing::info!(
                "lunge rep {} completed: depth {:.1}°, tempo {}s",
                self.knee.rep_count(),
                rep.range_of_motion,
                rep.tempo
            );
            new_rep = Some(rep);
            feedback = FEEDBACK_REP_COMPLETE;
        }

        if self.knee.is_active() && (left_knee > KNEE_DEPTH_TARGET || right_knee > KNEE_DEPTH_TARGET)
        {
            feedback = FEEDBACK_LUNGE_DEEPER;
        }

        AnalysisResult {
            rep_count: self.knee.rep_count(),
            feedback,
            stage: self.stage(),
            new_rep,
        }
    }

    fn rep_count(&self) -> u32 {
        self.knee.rep_count()
    }

    fn stage(&self) -> Stage {
        if self.knee.is_active() {
            Stage::Down
        } else {
            Stage::Up
        }
    }
}
