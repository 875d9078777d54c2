//! LocationIQ adapters for the core provider traits.
//!
//! [`LocationIqClient`] implements [`vicinity_core::SuggestionProvider`],
//! [`vicinity_core::PoiProvider`] and [`vicinity_core::RouteProvider`] over
//! the LocationIQ autocomplete, nearby and directions endpoints.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use vicinity_core::{Coordinate, PoiProvider};
//! use vicinity_data::locationiq::{LocationIqClient, LocationIqConfig};
//!
//! let config = LocationIqConfig::new("pk.your-key")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_poi_tag("amenity");
//! let client = LocationIqClient::with_config(config)?;
//!
//! let here = Coordinate::new(-34.6037, -58.3816)?;
//! for poi in client.nearby_pois(here, 800.0)? {
//!     println!("{}", poi.label);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod responses;

pub use client::{
    ClientBuildError, DEFAULT_AUTOCOMPLETE_BASE_URL, DEFAULT_BASE_URL, DEFAULT_USER_AGENT,
    LocationIqClient, LocationIqConfig,
};
pub use responses::{
    AutocompleteItem, Degrees, DirectionsResponse, DirectionsRoute, Identifier, LineGeometry,
    NearbyPlace,
};
