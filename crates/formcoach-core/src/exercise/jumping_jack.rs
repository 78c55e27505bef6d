//! Jumping jack: arms overhead plus ankle spread relative to shoulder width.

use super::tracker::{Extremum, RepTracker};
use super::{
    round_to, AnalysisResult, Analyzer, ExerciseType, Stage, FEEDBACK_JACK_OPEN,
    FEEDBACK_REP_COMPLETE,
};
use crate::pose::{
    Pose, LEFT_ANKLE, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ANKLE, RIGHT_SHOULDER, RIGHT_WRIST,
};

/// Wrist must clear the shoulder by this much to count as raised.
const WRIST_ABOVE_SHOULDER_MARGIN: f64 = 0.05;
/// Ankle separation / shoulder width above this -> legs open.
const ANKLE_OPEN_RATIO: f64 = 1.0;
/// Ankle separation / shoulder width below this -> legs closed.
const ANKLE_CLOSED_RATIO: f64 = 0.5;
/// Narrower shoulders than this are treated as a side-on or bad frame.
const MIN_SHOULDER_WIDTH: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct JumpingJackAnalyzer {
    tracker: RepTracker,
}

impl JumpingJackAnalyzer {
    pub const fn new() -> Self {
        Self {
            tracker: RepTracker::new(Extremum::Max, 0.0),
        }
    }
}

impl Default for JumpingJackAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for JumpingJackAnalyzer {
    fn exercise(&self) -> ExerciseType {
        ExerciseType::JumpingJack
    }

    fn start(&mut self, now_ms: u64) {
        self.tracker.start(now_ms);
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }

    fn analyze(&mut self, pose: &Pose, now_ms: u64) -> AnalysisResult {
        let Some([ls, rs, lw, rw, la, ra]) = pose.select([
            LEFT_SHOULDER,
            RIGHT_SHOULDER,
            LEFT_WRIST,
            RIGHT_WRIST,
            LEFT_ANKLE,
            RIGHT_ANKLE,
        ]) else {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        };

        let arms_up = lw.y < ls.y - WRIST_ABOVE_SHOULDER_MARGIN
            && rw.y < rs.y - WRIST_ABOVE_SHOULDER_MARGIN;

        let shoulder_width = (ls.x - rs.x).abs();
        let ankle_separation = (la.x - ra.x).abs();
        // Without a usable shoulder width the legs are neither open nor closed.
        let (ratio, legs_open, legs_closed) = if shoulder_width > MIN_SHOULDER_WIDTH {
            let ratio = ankle_separation / shoulder_width;
            (ratio, ratio > ANKLE_OPEN_RATIO, ratio < ANKLE_CLOSED_RATIO)
        } else {
            (0.0, false, false)
        };
        if !ratio.is_finite() {
            return AnalysisResult::skipped(self.rep_count(), self.stage());
        }

        let mut feedback = "";
        let mut new_rep = None;

        self.tracker.track(ratio);

        if !self.tracker.is_active() && arms_up && legs_open {
            self.tracker.enter();
            feedback = FEEDBACK_JACK_OPEN;
        } else if self.tracker.is_active() && !arms_up && legs_closed {
            let mut rep = self.tracker.complete(now_ms);
            rep.range_of_motion = round_to(rep.range_of_motion, 2);
            tracing::info!(
                "jumping jack rep {} completed: spread ratio {}, tempo {}s",
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
            Stage::Open
        } else {
            Stage::Closed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::testing::jack;

    #[test]
    fn open_then_closed_counts_one() {
        let mut jj = JumpingJackAnalyzer::new();
        assert_eq!(jj.stage(), Stage::Closed);

        let opened = jj.analyze(&jack(true, 1.2), 0);
        assert_eq!(opened.stage, Stage::Open);
        assert_eq!(opened.feedback, FEEDBACK_JACK_OPEN);

        jj.analyze(&jack(true, 1.456), 100);
        jj.analyze(&jack(false, 0.8), 200);
        let closed = jj.analyze(&jack(false, 0.3), 300);
        assert_eq!(closed.stage, Stage::Closed);
        assert_eq!(closed.rep_count, 1);
        assert_eq!(closed.new_rep.unwrap().range_of_motion, 1.46);
    }

    #[test]
    fn arms_up_alone_does_not_open() {
        let mut jj = JumpingJackAnalyzer::new();
        jj.analyze(&jack(true, 0.4), 0);
        assert_eq!(jj.stage(), Stage::Closed);
    }

    #[test]
    fn legs_closed_with_arms_still_up_does_not_count() {
        let mut jj = JumpingJackAnalyzer::new();
        jj.analyze(&jack(true, 1.5), 0);
        jj.analyze(&jack(true, 0.2), 100);
        assert_eq!(jj.rep_count(), 0);
        assert_eq!(jj.stage(), Stage::Open);
    }

    #[test]
    fn collapsed_shoulders_never_close() {
        let mut jj = JumpingJackAnalyzer::new();
        jj.analyze(&jack(true, 1.5), 0);
        let mut pose = jack(false, 0.2);
        let ls = *pose.get(LEFT_SHOULDER).unwrap();
        pose.set(RIGHT_SHOULDER, ls);
        jj.analyze(&pose, 100);
        assert_eq!(jj.rep_count(), 0);
    }
}
