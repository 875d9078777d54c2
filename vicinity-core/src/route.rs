//! Routed paths between the reference location and a destination.
//!
//! A route records the endpoints it was requested for so reconciliation can
//! refuse one that no longer matches the active destination.

use thiserror::Error;

use crate::{Coordinate, DistanceError, path_length};

/// A driving route returned by a routing provider.
///
/// # Examples
/// ```
/// use vicinity_core::{Coordinate, Route};
///
/// # fn main() -> Result<(), vicinity_core::RouteError> {
/// let from = Coordinate { latitude: -34.60, longitude: -58.38 };
/// let to = Coordinate { latitude: -34.59, longitude: -58.40 };
/// let route = Route::new(from, to, vec![from, to], 2_450.0)?;
/// assert_eq!(route.length_m, 2_450.0);
/// assert!(route.is_drawable());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Where the route was requested from.
    pub origin: Coordinate,
    /// Destination the route was requested for.
    pub target: Coordinate,
    /// Ordered path vertices; may be empty when the provider sent no geometry.
    pub path: Vec<Coordinate>,
    /// Total path length in metres.
    pub length_m: f64,
}

/// Errors returned by [`Route::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// The reported length was negative, NaN or infinite.
    #[error("route length must be a finite, non-negative number of metres, got {0}")]
    InvalidLength(f64),
    /// A path vertex could not be measured.
    #[error("route path contains an invalid vertex: {0}")]
    InvalidVertex(#[from] DistanceError),
}

impl Route {
    /// Validates and constructs a [`Route`].
    pub fn new(
        origin: Coordinate,
        target: Coordinate,
        path: Vec<Coordinate>,
        length_m: f64,
    ) -> Result<Self, RouteError> {
        if !length_m.is_finite() || length_m < 0.0 {
            return Err(RouteError::InvalidLength(length_m));
        }
        Ok(Self {
            origin,
            target,
            path,
            length_m,
        })
    }

    /// Build a route whose length is measured along `path`.
    ///
    /// Used when a provider returns geometry without a total length.
    pub fn from_path(
        origin: Coordinate,
        target: Coordinate,
        path: Vec<Coordinate>,
    ) -> Result<Self, RouteError> {
        let length_m = path_length(&path)?;
        Self::new(origin, target, path, length_m)
    }

    /// Whether the path has enough vertices to draw a polyline.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.path.len() > 1
    }

    /// Whether this route was requested between `origin` and `target`.
    #[must_use]
    pub fn connects(&self, origin: Coordinate, target: Coordinate) -> bool {
        self.origin == origin && self.target == target
    }
}
