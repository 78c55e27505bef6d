//! Readiness gate for calibration.
//!
//! Only used before a session starts: decides whether a frame shows a whole
//! person standing in view, which unlocks the confirmation step.

use super::{Pose, LEFT_HIP, LEFT_SHOULDER, RIGHT_HIP, RIGHT_SHOULDER};

/// Minimum confidence for a torso landmark to count as seen.
pub const READY_VISIBILITY_THRESHOLD: f64 = 0.6;

/// Minimum vertical extent (max y - min y) of the whole skeleton.
pub const READY_SPREAD_THRESHOLD: f64 = 0.5;

const TORSO: [usize; 4] = [LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP];
const MIN_VISIBLE_TORSO_POINTS: usize = 3;

/// Returns true if `pose` is a usable standing pose.
///
/// Fails when the frame is absent or empty, when fewer than three of the
/// four torso points are confidently visible, or when the skeleton spans
/// less than half of the frame height (too close, too far or cropped).
pub fn is_ready_pose(pose: Option<&Pose>) -> bool {
    let Some(pose) = pose.filter(|p| !p.is_empty()) else {
        return false;
    };

    let visible = TORSO
        .iter()
        .filter_map(|&i| pose.get(i))
        .filter(|lm| lm.visibility.is_some_and(|v| v > READY_VISIBILITY_THRESHOLD))
        .count();
    if visible < MIN_VISIBLE_TORSO_POINTS {
        return false;
    }

    let (min_y, max_y) = pose
        .landmarks()
        .iter()
        .fold((1.0_f64, 0.0_f64), |(lo, hi), lm| (lo.min(lm.y), hi.max(lm.y)));

    max_y - min_y >= READY_SPREAD_THRESHOLD
}
