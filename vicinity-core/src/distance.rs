//! Great-circle distance on a spherical Earth.
//!
//! Distances use the haversine formula with a fixed mean radius of
//! [`EARTH_MEAN_RADIUS_M`]. Inputs are degrees; results are metres.

use std::cmp::Ordering;

use thiserror::Error;

use crate::Coordinate;

/// Mean Earth radius in metres.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_000.0;

/// Errors from [`haversine_distance`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DistanceError {
    /// A coordinate component was NaN or infinite.
    #[error("invalid coordinate {0}")]
    InvalidCoordinate(Coordinate),
}

/// Straight-line distance in metres between `a` and `b`.
///
/// The result is exactly symmetric and `0.0` for identical points. The
/// haversine term is clamped to `[0, 1]` so antipodal and polar inputs cannot
/// push the inverse sine out of its domain.
///
/// # Errors
///
/// Returns [`DistanceError::InvalidCoordinate`] when either coordinate has a
/// non-finite component.
///
/// # Examples
/// ```
/// use vicinity_core::{Coordinate, haversine_distance};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let a = Coordinate::new(0.0, 0.0)?;
/// let b = Coordinate::new(1.0, 0.0)?;
/// let metres = haversine_distance(a, b)?;
/// assert!((metres - 111_195.0).abs() < 1.0);
/// # Ok(())
/// # }
/// ```
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> Result<f64, DistanceError> {
    for coordinate in [a, b] {
        if !coordinate.is_finite() {
            return Err(DistanceError::InvalidCoordinate(coordinate));
        }
    }
    if a == b {
        return Ok(0.0);
    }

    // Evaluate in a canonical order so swapping the arguments replays the
    // same floating-point operations.
    let (first, second) = match compare(&a, &b) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    };

    let lat1 = first.latitude.to_radians();
    let lat2 = second.latitude.to_radians();
    let half_dlat = (second.latitude - first.latitude).to_radians() / 2.0;
    let half_dlon = (second.longitude - first.longitude).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    let central_angle = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    Ok(EARTH_MEAN_RADIUS_M * central_angle)
}

/// Total length in metres of a polyline through `vertices`.
///
/// Fewer than two vertices yield `0.0`.
///
/// # Errors
///
/// Returns [`DistanceError::InvalidCoordinate`] for the first non-finite
/// vertex encountered.
pub fn path_length(vertices: &[Coordinate]) -> Result<f64, DistanceError> {
    vertices
        .windows(2)
        .try_fold(0.0, |total, leg| match leg {
            [from, to] => Ok(total + haversine_distance(*from, *to)?),
            _ => Ok(total),
        })
}

fn compare(a: &Coordinate, b: &Coordinate) -> Ordering {
    a.latitude
        .total_cmp(&b.latitude)
        .then_with(|| a.longitude.total_cmp(&b.longitude))
}
