//! Core of the Vicinity proximity engine.
//!
//! The crate measures great-circle distance, ranks search suggestions and
//! points of interest nearest-first around a reference location, and keeps
//! the single active destination with its routed distance. It performs no
//! I/O: hosts fetch data through the [`provider`] traits and feed results to
//! a [`ProximitySession`], which discards responses that arrive after the
//! query, reference or destination they were requested for has changed.
//!
//! Coordinates are WGS84 degrees; distances are metres.

mod candidate;
mod coordinate;
mod destination;
mod distance;
mod generation;
pub mod provider;
mod rank;
mod route;
mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use candidate::{Candidate, Distance};
pub use coordinate::{Coordinate, CoordinateError, LATITUDE_RANGE, LONGITUDE_RANGE};
pub use destination::{
    ActiveDestination, AttachRouteError, Destination, DestinationKind, DestinationState,
    active_distance,
};
pub use distance::{DistanceError, EARTH_MEAN_RADIUS_M, haversine_distance, path_length};
pub use generation::Generation;
pub use provider::{PoiProvider, ProviderError, ReferenceProvider, RouteProvider, SuggestionProvider};
pub use rank::{rank, rank_within};
pub use route::{Route, RouteError};
pub use session::{
    CURRENT_LOCATION_LABEL, DEFAULT_MIN_QUERY_CHARS, DEFAULT_POI_RADIUS_M, PoiTicket,
    ProximitySession, QueryTicket, ResultKind, RouteTicket, SessionConfig, SessionError,
    SessionView,
};
