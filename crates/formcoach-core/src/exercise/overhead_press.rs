//! Overhead press: wrist height against nose and shoulders.
//!
//! Range of motion is the highest wrist position reached, as a normalized y
//! value (smaller is higher).

use super::tracker::{Extremum, RepTracker};
use super::{AnalysisResult, Analyzer, ExerciseType, Stage, FEEDBACK_REP_COMPLETE};
use crate::pose::{Pose, LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_SHOULDER, RIGHT_WRIST};

#[derive(Debug, Clone, PartialEq)]
pub struct OverheadPressAnalyzer {
    tracker: RepTracker,
}

impl OverheadPressAnalyzer {
    pub const fn new() -> Self {
        Self {
            tracker: RepTracker::new(Extremum::Min, 1.0),
        }
    }
}

impl Default for OverheadPressAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for OverheadPressAnalyzer {
    fn exercise(&self) -> ExerciseType {
        ExerciseType::OverheadPress
    }

    fn start(&mut self, now_ms: u64) {
        self.tracker.start(now_ms);
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }

    fn analyze(&mut self, pose: &Pose, now_ms: u64) -> AnalysisResult {
        let Some([nose, ls, rs, lw, rw]) =
            pose.select([NOSE, LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_WRIST, RIGHT_WRIST])
        else {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        };

        let shoulder_y = (ls.y + rs.y) / 2.0;
        let wrist_y = (lw.y + rw.y) / 2.0;
        if !(shoulder_y.is_finite() && wrist_y.is_finite() && nose.y.is_finite()) {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        }
        let arms_up = wrist_y < nose.y;
        let arms_down = wrist_y > shoulder_y;

        let mut feedback = "";
        let mut new_rep = None;

        self.tracker.track(wrist_y);

        if !self.tracker.is_active() && arms_up {
            self.tracker.enter();
        } else if self.tracker.is_active() && arms_down {
            let rep = self.tracker.complete(now_ms);
            tracing::info!(
                "overhead press rep {} completed: height {:.2}, tempo {}s",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::testing::wrists_at;

    #[test]
    fn press_records_highest_wrist() {
        let mut press = OverheadPressAnalyzer::new();
        let mut reps = Vec::new();
        for (i, y) in [0.4, 0.25, 0.15, 0.08, 0.12, 0.28, 0.35].into_iter().enumerate() {
            reps.extend(press.analyze(&wrists_at(y), i as u64 * 100).new_rep);
        }
        assert_eq!(press.rep_count(), 1);
        assert!((reps[0].range_of_motion - 0.08).abs() < 1e-9);
    }

    #[test]
    fn wrists_between_nose_and_shoulders_hold_stage() {
        let mut press = OverheadPressAnalyzer::new();
        press.analyze(&wrists_at(0.1), 0);
        for _ in 0..20 {
            press.analyze(&wrists_at(0.25), 0);
        }
        assert_eq!(press.stage(), Stage::Up);
        assert_eq!(press.rep_count(), 0);
    }
}
