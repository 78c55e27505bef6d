//! Bicep curl: right elbow angle, min-angle peak contraction.

use super::tracker::{Extremum, RepTracker};
use super::{AnalysisResult, Analyzer, ExerciseType, Stage, FEEDBACK_REP_COMPLETE};
use crate::pose::{angle_at, Pose, RIGHT_ELBOW, RIGHT_SHOULDER, RIGHT_WRIST};

/// Elbow closed past this angle -> up.
const ELBOW_UP_THRESHOLD: f64 = 70.0;
/// Elbow opened past this angle -> down, repetition counted.
const ELBOW_DOWN_THRESHOLD: f64 = 160.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BicepCurlAnalyzer {
    tracker: RepTracker,
}

impl BicepCurlAnalyzer {
    pub const fn new() -> Self {
        Self {
            tracker: RepTracker::new(Extremum::Min, 180.0),
        }
    }
}

impl Default for BicepCurlAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for BicepCurlAnalyzer {
    fn exercise(&self) -> ExerciseType {
        ExerciseType::BicepCurl
    }

    fn start(&mut self, now_ms: u64) {
        self.tracker.start(now_ms);
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }

    fn analyze(&mut self, pose: &Pose, now_ms: u64) -> AnalysisResult {
        let elbow = pose
            .select([RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST])
            .and_then(|[s, e, w]| angle_at(&s, &e, &w));
        let Some(elbow) = elbow else {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        };

        let mut feedback = "";
        let mut new_rep = None;

        self.tracker.track(elbow);

        if !self.tracker.is_active() && elbow < ELBOW_UP_THRESHOLD {
            self.tracker.enter();
        } else if self.tracker.is_active() && elbow > ELBOW_DOWN_THRESHOLD {
            let rep = self.tracker.complete(now_ms);
            tracing::info!(
                "bicep curl rep {} completed: peak {:.1}°, tempo {}s",
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
