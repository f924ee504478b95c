//! Planar vector utilities for joint-angle computations.

use nalgebra::Vector2;

use crate::error::{Error, Result};
use crate::types::Keypoint;

/// Vector pointing from `from` to `to`
pub fn segment(from: &Keypoint, to: &Keypoint) -> Vector2<f64> {
    Vector2::new(to.x - from.x, to.y - from.y)
}

/// Unit-normalize a segment vector
///
/// A zero-length segment has no direction, so it is reported against the
/// usable frame it came from instead of producing NaN angles downstream.
pub fn unit_segment(v: &Vector2<f64>, frame: usize, name: &'static str) -> Result<Vector2<f64>> {
    let norm = v.norm();
    if norm <= f64::EPSILON || !norm.is_finite() {
        return Err(Error::DegenerateVector {
            frame,
            segment: name,
        });
    }
    Ok(v / norm)
}

/// Angle between two unit vectors in degrees
pub fn angle_between_degrees(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.dot(v).clamp(-1.0, 1.0).acos().to_degrees()
}
