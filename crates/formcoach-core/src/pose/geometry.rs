//! Joint angle calculation using the dot product.

use super::Landmark;

const MIN_SEGMENT_LENGTH: f64 = 1e-9;

/// Angle in degrees at `vertex` between the segments to `a` and `c`.
///
/// Uses `cos(θ) = (v1 · v2) / (|v1| × |v2|)`, so the result lies in
/// `[0, 180]`. Returns `None` when either segment has zero length: the
/// angle is undefined and callers treat the measurement as unavailable for
/// this frame.
pub fn angle_at(a: &Landmark, vertex: &Landmark, c: &Landmark) -> Option<f64> {
    let v1 = (a.x - vertex.x, a.y - vertex.y);
    let v2 = (c.x - vertex.x, c.y - vertex.y);

    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);
    if !(mag1 > MIN_SEGMENT_LENGTH && mag2 > MIN_SEGMENT_LENGTH) {
        return None;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    // Rounding can push collinear vectors just past ±1.
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Landmark {
        Landmark::new(x, y)
    }

    #[test]
    fn straight_line_is_180() {
        let angle = angle_at(&p(0.0, 0.0), &p(0.5, 0.0), &p(1.0, 0.0)).unwrap();
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn right_angle_is_90() {
        let angle = angle_at(&p(0.0, 0.0), &p(0.5, 0.0), &p(0.5, 0.5)).unwrap();
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn folded_back_is_0() {
        let angle = angle_at(&p(1.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0)).unwrap();
        assert!(angle.abs() < 1e-6);
    }

    #[test]
    fn coincident_points_have_no_angle() {
        assert!(angle_at(&p(0.3, 0.3), &p(0.3, 0.3), &p(0.9, 0.1)).is_none());
        assert!(angle_at(&p(0.1, 0.1), &p(0.3, 0.3), &p(0.3, 0.3)).is_none());
    }

    #[test]
    fn nan_coordinates_have_no_angle() {
        assert!(angle_at(&p(f64::NAN, 0.0), &p(0.3, 0.3), &p(0.9, 0.1)).is_none());
    }
}
