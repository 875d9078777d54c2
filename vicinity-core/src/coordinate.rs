//! Geographic coordinates in WGS84 degrees.

use geo::Coord;
use thiserror::Error;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A latitude/longitude pair in degrees.
///
/// Fields are public so hosts can carry raw provider data through the engine;
/// use [`Coordinate::new`] when the input should be validated up front. The
/// distance function rejects non-finite components regardless of how the value
/// was built.
///
/// # Examples
/// ```
/// use vicinity_core::Coordinate;
///
/// # fn main() -> Result<(), vicinity_core::CoordinateError> {
/// let obelisco = Coordinate::new(-34.6037, -58.3816)?;
/// assert_eq!(obelisco.latitude, -34.6037);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    /// Degrees north of the equator.
    pub latitude: f64,
    /// Degrees east of the prime meridian.
    pub longitude: f64,
}

/// Errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// A component was NaN or infinite.
    #[error("coordinate components must be finite numbers")]
    NonFinite,
    /// Latitude fell outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude fell outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    /// Validates and constructs a [`Coordinate`].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check that both components are finite and within range.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !self.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !LATITUDE_RANGE.contains(&self.latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(self.latitude));
        }
        if !LONGITUDE_RANGE.contains(&self.longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(value: Coordinate) -> Self {
        Self {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

impl TryFrom<Coord<f64>> for Coordinate {
    type Error = CoordinateError;

    /// Interpret `x` as longitude and `y` as latitude.
    fn try_from(value: Coord<f64>) -> Result<Self, Self::Error> {
        Self::new(value.y, value.x)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
