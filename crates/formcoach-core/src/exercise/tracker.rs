//! Repetition bookkeeping shared by every analyzer.

use super::{round_to, RepetitionEvent};

/// Which end of the measurement counts as "better" for a repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extremum {
    Min,
    Max,
}

/// Rep count, active flag, per-repetition extremum and tempo origin.
///
/// The analyzer decides *when* to enter or complete; the tracker owns what
/// happens to the counters at those moments.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RepTracker {
    extremum: Extremum,
    sentinel: f64,
    best: f64,
    active: bool,
    rep_count: u32,
    /// Timestamp (ms since epoch) of the last completed repetition, or of
    /// `start()` before the first one. 0 when never stamped.
    last_rep_ms: u64,
}

impl RepTracker {
    pub(crate) const fn new(extremum: Extremum, sentinel: f64) -> Self {
        Self {
            extremum,
            sentinel,
            best: sentinel,
            active: false,
            rep_count: 0,
            last_rep_ms: 0,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn rep_count(&self) -> u32 {
        self.rep_count
    }

    /// Fold a measurement into the extremum; ignored while at rest.
    pub(crate) fn track(&mut self, value: f64) {
        if !self.active {
            return;
        }
        self.best = match self.extremum {
            Extremum::Min => self.best.min(value),
            Extremum::Max => self.best.max(value),
        };
    }

    /// Rest -> active. Restarts the extremum from the sentinel.
    pub(crate) fn enter(&mut self) {
        self.active = true;
        self.best = self.sentinel;
    }

    /// Active -> rest. Counts the repetition and returns its metrics.
    pub(crate) fn complete(&mut self, now_ms: u64) -> RepetitionEvent {
        let tempo = if self.rep_count == 0 {
            0.0
        } else {
            now_ms.saturating_sub(self.last_rep_ms) as f64 / 1000.0
        };
        self.active = false;
        self.rep_count += 1;
        self.last_rep_ms = now_ms;
        RepetitionEvent {
            timestamp_ms: now_ms,
            range_of_motion: self.best,
            tempo: round_to(tempo, 2),
        }
    }

    pub(crate) fn start(&mut self, now_ms: u64) {
        self.last_rep_ms = now_ms;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.extremum, self.sentinel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_only_while_active() {
        let mut t = RepTracker::new(Extremum::Min, 180.0);
        t.track(10.0);
        t.enter();
        t.track(120.0);
        t.track(85.0);
        t.track(100.0);
        assert_eq!(t.complete(1_000).range_of_motion, 85.0);
    }

    #[test]
    fn enter_restarts_extremum() {
        let mut t = RepTracker::new(Extremum::Max, 0.0);
        t.enter();
        t.track(2.0);
        t.complete(1_000);
        t.enter();
        t.track(1.5);
        assert_eq!(t.complete(2_000).range_of_motion, 1.5);
    }

    #[test]
    fn first_tempo_is_zero_even_after_start() {
        let mut t = RepTracker::new(Extremum::Min, 180.0);
        t.start(10_000);
        t.enter();
        let first = t.complete(13_500);
        assert_eq!(first.tempo, 0.0);
        t.enter();
        let second = t.complete(15_756);
        assert_eq!(second.tempo, 2.26);
    }

    #[test]
    fn reset_restores_construction_state() {
        let fresh = RepTracker::new(Extremum::Min, 180.0);
        let mut t = fresh.clone();
        t.start(5);
        t.enter();
        t.track(42.0);
        t.complete(9);
        t.enter();
        t.reset();
        assert_eq!(t, fresh);
    }
}
