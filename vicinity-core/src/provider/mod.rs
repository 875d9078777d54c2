//! External collaborators that feed the engine.
//!
//! The engine performs no I/O itself. Hosts implement these traits over the
//! device positioning service and whichever search, POI and routing APIs they
//! use, then hand the results to a [`crate::ProximitySession`].
//!
//! The traits are synchronous to keep the core embeddable anywhere; an
//! asynchronous host calls its own clients and feeds the results through the
//! session's ticketed `apply_*` methods instead.

mod error;

pub use error::ProviderError;

use crate::{Candidate, Coordinate, Route};

/// Source of the reference location, typically the device position.
///
/// # Examples
///
/// ```rust
/// use vicinity_core::{Coordinate, ProviderError, ReferenceProvider};
///
/// struct Fixed(Coordinate);
///
/// impl ReferenceProvider for Fixed {
///     fn current_reference(&self) -> Result<Coordinate, ProviderError> {
///         Ok(self.0)
///     }
/// }
///
/// let here = Coordinate { latitude: -34.6, longitude: -58.38 };
/// assert_eq!(Fixed(here).current_reference()?, here);
/// # Ok::<(), ProviderError>(())
/// ```
pub trait ReferenceProvider {
    /// Return the current reference location.
    ///
    /// Implementations return [`ProviderError::ReferenceUnavailable`] when
    /// positioning is denied or fails.
    fn current_reference(&self) -> Result<Coordinate, ProviderError>;
}

/// Autocomplete search over free-text addresses.
pub trait SuggestionProvider {
    /// Return suggestions for `query`, in provider order.
    ///
    /// Candidates may lack a coordinate; the ranker places those last.
    fn search_suggestions(&self, query: &str) -> Result<Vec<Candidate>, ProviderError>;
}

/// Lookup of points of interest around a location.
pub trait PoiProvider {
    /// Return POIs within `radius_m` metres of `reference`.
    fn nearby_pois(
        &self,
        reference: Coordinate,
        radius_m: f64,
    ) -> Result<Vec<Candidate>, ProviderError>;
}

/// Driving directions between two coordinates.
pub trait RouteProvider {
    /// Return a route from `from` to `to`.
    ///
    /// The returned [`Route`] must carry `from` as its origin and `to` as its
    /// target so the session can match it to the request.
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<Route, ProviderError>;
}
