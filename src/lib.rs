//! Facade crate for the Vicinity proximity engine.
//!
//! This crate re-exports the core distance, ranking and destination types and
//! exposes the LocationIQ-backed providers behind the `locationiq` feature.

#![forbid(unsafe_code)]

pub use vicinity_core::{
    ActiveDestination, AttachRouteError, Candidate, Coordinate, CoordinateError, Destination,
    DestinationKind, DestinationState, Distance, DistanceError, PoiProvider, ProviderError,
    ProximitySession, ReferenceProvider, Route, RouteError, RouteProvider, SessionConfig,
    SessionError, SessionView, SuggestionProvider, active_distance, haversine_distance, rank,
    rank_within,
};

#[cfg(feature = "locationiq")]
pub use vicinity_data::locationiq::{LocationIqClient, LocationIqConfig};
