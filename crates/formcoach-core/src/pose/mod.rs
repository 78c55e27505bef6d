//! Body landmarks as delivered by the external pose detector.
//!
//! A [`Pose`] is the detector's per-frame output: normalized 2D keypoints in
//! the fixed 33-point schema (index 11 is always the left shoulder, and so
//! on). Detectors occasionally hand over short or empty frames, so every
//! accessor here returns `Option` instead of indexing blindly.

mod gate;
mod geometry;

pub use gate::{is_ready_pose, READY_SPREAD_THRESHOLD, READY_VISIBILITY_THRESHOLD};
pub use geometry::angle_at;

use serde::{Deserialize, Serialize};

// ============================================================================
// LANDMARK INDICES (33-point body schema)
// ============================================================================

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Number of landmarks in a complete frame.
pub const LANDMARK_COUNT: usize = 33;

/// A single normalized keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// 0-1 normalized, left to right
    pub x: f64,
    /// 0-1 normalized, top to bottom
    pub y: f64,
    /// Detector confidence, when the detector reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

/// One frame of landmarks, indexed by anatomical role.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose {
    landmarks: Vec<Landmark>,
}

impl Pose {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// A full frame with every landmark at `(0.5, 0.5)`; handy as a base to
    /// move individual joints around.
    pub fn neutral() -> Self {
        Self::new(vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT])
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    /// Fetch several landmarks at once; `None` if any of them is missing.
    pub fn select<const N: usize>(&self, indices: [usize; N]) -> Option<[Landmark; N]> {
        let mut out = [Landmark::default(); N];
        for (slot, index) in out.iter_mut().zip(indices) {
            *slot = *self.get(index)?;
        }
        Some(out)
    }

    pub fn set(&mut self, index: usize, landmark: Landmark) {
        if let Some(slot) = self.landmarks.get_mut(index) {
            *slot = landmark;
        }
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// True when every index of the body schema is present.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT
    }
}

impl From<Vec<Landmark>> for Pose {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self::new(landmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_returns_none_for_short_frame() {
        let pose = Pose::new(vec![Landmark::new(0.1, 0.2); 12]);
        assert!(pose.select([NOSE, LEFT_SHOULDER]).is_some());
        assert!(pose.select([NOSE, LEFT_HIP]).is_none());
    }

    #[test]
    fn set_ignores_out_of_range_index() {
        let mut pose = Pose::new(vec![Landmark::default(); 2]);
        pose.set(5, Landmark::new(1.0, 1.0));
        assert_eq!(pose.len(), 2);
    }

    #[test]
    fn deserializes_from_plain_array() {
        let json = r#"[{"x":0.1,"y":0.2,"visibility":0.9},{"x":0.3,"y":0.4}]"#;
        let pose: Pose = serde_json::from_str(json).unwrap();
        assert_eq!(pose.len(), 2);
        assert_eq!(pose.get(0).unwrap().visibility, Some(0.9));
        assert_eq!(pose.get(1).unwrap().visibility, None);
    }
}
