//! LocationIQ response bodies.
//!
//! LocationIQ serialises coordinates and identifiers as strings on some
//! endpoints and numbers on others, so both forms are accepted.
//!
//! See: <https://docs.locationiq.com/reference>

use serde::Deserialize;

/// A latitude or longitude as sent by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Degrees {
    /// JSON number.
    Number(f64),
    /// Decimal string such as `"-34.6037"`.
    Text(String),
}

impl Degrees {
    /// Parsed finite value, or `None` when the text is not a number.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        let parsed = match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
        };
        parsed.filter(|v| v.is_finite())
    }
}

/// A place or OSM identifier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// JSON number.
    Number(u64),
    /// JSON string.
    Text(String),
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One entry of an autocomplete response array.
#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteItem {
    /// Provider place identifier.
    pub place_id: Option<Identifier>,
    /// Full formatted address.
    pub display_name: Option<String>,
    /// Latitude, usually a string.
    pub lat: Option<Degrees>,
    /// Longitude, usually a string.
    pub lon: Option<Degrees>,
    /// OSM class, e.g. `highway`.
    pub class: Option<String>,
    /// OSM type, e.g. `residential`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// One entry of a nearby response array.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyPlace {
    /// OpenStreetMap identifier.
    pub osm_id: Option<Identifier>,
    /// Provider place identifier.
    pub place_id: Option<Identifier>,
    /// Place name; often missing for amenities.
    pub name: Option<String>,
    /// Latitude, usually a string.
    pub lat: Option<Degrees>,
    /// Longitude, usually a string.
    pub lon: Option<Degrees>,
    /// OSM class, e.g. `amenity`.
    pub class: Option<String>,
    /// OSM type, e.g. `pharmacy`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Provider-reported distance in metres.
    pub distance: Option<f64>,
}

/// Directions API response.
///
/// The service mirrors OSRM's route service: `code` is `"Ok"` on success.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    /// Status code; `"Ok"` on success.
    pub code: String,
    /// Error detail when `code` is not `"Ok"`.
    pub message: Option<String>,
    /// Alternative routes, best first.
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

impl DirectionsResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// A single route from the directions response.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsRoute {
    /// Route length in metres.
    pub distance: f64,
    /// Travel time in seconds.
    pub duration: Option<f64>,
    /// Full-resolution GeoJSON geometry when `geometries=geojson` was sent.
    pub geometry: Option<LineGeometry>,
}

/// GeoJSON `LineString` geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct LineGeometry {
    /// `[longitude, latitude]` pairs in path order.
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}
