//! Blocking LocationIQ client implementing the core provider traits.
//!
//! The provider traits are synchronous to keep the core embeddable in
//! synchronous contexts. The client bridges the async HTTP calls to those
//! traits by blocking on a Tokio runtime it owns.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;
use vicinity_core::{
    Candidate, Coordinate, PoiProvider, ProviderError, Route, RouteProvider, SuggestionProvider,
};

use super::responses::{AutocompleteItem, Degrees, DirectionsResponse, NearbyPlace};

/// Error type for [`LocationIqClient`] construction failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// No API key was configured.
    #[error("a LocationIQ API key is required")]
    MissingApiKey,
    /// A configured base URL could not be parsed.
    #[error("invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        /// The rejected URL text.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for LocationIQ requests.
pub const DEFAULT_USER_AGENT: &str = "vicinity/0.1";

/// Default base URL for the nearby and directions endpoints.
pub const DEFAULT_BASE_URL: &str = "https://us1.locationiq.com/v1";

/// Default base URL for the autocomplete endpoint.
pub const DEFAULT_AUTOCOMPLETE_BASE_URL: &str = "https://api.locationiq.com/v1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Placeholder written over the API key in URLs that end up in errors.
const REDACTED: &str = "REDACTED";

/// Configuration for [`LocationIqClient`].
#[derive(Clone)]
pub struct LocationIqConfig {
    /// Access token sent as the `key` query parameter.
    pub api_key: String,
    /// Base URL for nearby and directions requests.
    pub base_url: String,
    /// Base URL for autocomplete requests.
    pub autocomplete_base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Maximum autocomplete suggestions per query.
    pub suggestion_limit: u32,
    /// Maximum places per nearby lookup.
    pub poi_limit: u32,
    /// OSM tag filter for nearby lookups.
    pub poi_tag: String,
    /// Directions profile, e.g. `driving`.
    pub profile: String,
}

impl Default for LocationIqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            autocomplete_base_url: DEFAULT_AUTOCOMPLETE_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            suggestion_limit: 5,
            poi_limit: 30,
            poi_tag: "amenity".to_owned(),
            profile: "driving".to_owned(),
        }
    }
}

impl std::fmt::Debug for LocationIqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationIqConfig")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("autocomplete_base_url", &self.autocomplete_base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("suggestion_limit", &self.suggestion_limit)
            .field("poi_limit", &self.poi_limit)
            .field("poi_tag", &self.poi_tag)
            .field("profile", &self.profile)
            .finish()
    }
}

impl LocationIqConfig {
    /// Create a configuration with the given API key and default endpoints.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Point nearby and directions requests at another host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Point autocomplete requests at another host.
    #[must_use]
    pub fn with_autocomplete_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.autocomplete_base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the autocomplete result limit.
    #[must_use]
    pub fn with_suggestion_limit(mut self, limit: u32) -> Self {
        self.suggestion_limit = limit;
        self
    }

    /// Set the nearby result limit.
    #[must_use]
    pub fn with_poi_limit(mut self, limit: u32) -> Self {
        self.poi_limit = limit;
        self
    }

    /// Set the OSM tag filter for nearby lookups.
    #[must_use]
    pub fn with_poi_tag(mut self, tag: impl Into<String>) -> Self {
        self.poi_tag = tag.into();
        self
    }
}

/// LocationIQ client for autocomplete, nearby and directions requests.
///
/// The client implements [`SuggestionProvider`], [`PoiProvider`] and
/// [`RouteProvider`] by blocking on asynchronous HTTP requests. It owns a
/// current-thread Tokio runtime that is reused across calls.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the client uses its own runtime. Inside a
/// multi-threaded runtime it blocks through that runtime's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it falls
/// back to its own runtime, which may deadlock if the caller's runtime drives
/// IO this request depends on.
pub struct LocationIqClient {
    client: Client,
    config: LocationIqConfig,
    base_url: Url,
    autocomplete_base_url: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for LocationIqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationIqClient")
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl LocationIqClient {
    /// Create a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(LocationIqConfig::new(api_key))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, a base URL does not parse, or
    /// the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: LocationIqConfig) -> Result<Self, ClientBuildError> {
        if config.api_key.trim().is_empty() {
            return Err(ClientBuildError::MissingApiKey);
        }
        let base_url = parse_base(&config.base_url)?;
        let autocomplete_base_url = parse_base(&config.autocomplete_base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            base_url,
            autocomplete_base_url,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &LocationIqConfig {
        &self.config
    }

    /// `{autocomplete_base}/autocomplete?key&q&limit&dedupe=1&normalizeaddress=1`
    fn build_autocomplete_url(&self, query: &str) -> Url {
        let mut url = endpoint(&self.autocomplete_base_url, &["autocomplete"]);
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("q", query)
            .append_pair("limit", &self.config.suggestion_limit.to_string())
            .append_pair("dedupe", "1")
            .append_pair("normalizeaddress", "1");
        url
    }

    /// `{base}/nearby?key&lat&lon&tag&radius&limit`
    fn build_nearby_url(&self, reference: Coordinate, radius_m: f64) -> Url {
        let mut url = endpoint(&self.base_url, &["nearby"]);
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("lat", &reference.latitude.to_string())
            .append_pair("lon", &reference.longitude.to_string())
            .append_pair("tag", &self.config.poi_tag)
            .append_pair("radius", &format!("{}", radius_m.round()))
            .append_pair("limit", &self.config.poi_limit.to_string());
        url
    }

    /// `{base}/directions/{profile}/{lon},{lat};{lon},{lat}?key&overview=full&geometries=geojson`
    fn build_directions_url(&self, from: Coordinate, to: Coordinate) -> Url {
        let waypoints = format!(
            "{},{};{},{}",
            from.longitude, from.latitude, to.longitude, to.latitude
        );
        let mut url = endpoint(
            &self.base_url,
            &["directions", &self.config.profile, &waypoints],
        );
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        url
    }

    /// Fetch and decode a JSON body.
    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let shown = redact(&url);
        debug!("GET {shown}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &shown))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, &shown))?;

        response
            .json::<T>()
            .await
            .map_err(|err| ProviderError::ParseError {
                message: err.without_url().to_string(),
            })
    }

    /// Convert a reqwest error to a [`ProviderError`].
    ///
    /// The URL reqwest embeds in its message carries the API key, so it is
    /// dropped and `url` (already redacted) is reported instead.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> ProviderError {
        if error.is_timeout() {
            return ProviderError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        let status = error.status();
        let message = error.without_url().to_string();
        if let Some(status) = status {
            return ProviderError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message,
            };
        }

        ProviderError::NetworkError {
            url: url.to_owned(),
            message,
        }
    }

    /// Drive `future` to completion from synchronous code.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

impl SuggestionProvider for LocationIqClient {
    fn search_suggestions(&self, query: &str) -> Result<Vec<Candidate>, ProviderError> {
        let url = self.build_autocomplete_url(query);
        let items: Vec<AutocompleteItem> = self.block_on(self.fetch_json(url))?;
        Ok(items.into_iter().map(convert_suggestion).collect())
    }
}

impl PoiProvider for LocationIqClient {
    fn nearby_pois(
        &self,
        reference: Coordinate,
        radius_m: f64,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let url = self.build_nearby_url(reference, radius_m);
        let places: Vec<NearbyPlace> = self.block_on(self.fetch_json(url))?;
        Ok(places.into_iter().map(convert_place).collect())
    }
}

impl RouteProvider for LocationIqClient {
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<Route, ProviderError> {
        let url = self.build_directions_url(from, to);
        let response: DirectionsResponse = self.block_on(self.fetch_json(url))?;
        convert_directions(from, to, response)
    }
}

fn parse_base(raw: &str) -> Result<Url, ClientBuildError> {
    Url::parse(raw.trim_end_matches('/')).map_err(|source| ClientBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        source,
    })
}

/// Append `segments` to the path of `base`.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Render `url` with its `key` parameter masked.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "key" { REDACTED.to_owned() } else { v.into_owned() };
            (k.into_owned(), value)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

fn coordinate_from(lat: Option<&Degrees>, lon: Option<&Degrees>, label: &str) -> Option<Coordinate> {
    let (Some(lat), Some(lon)) = (lat, lon) else {
        warn!("{label}: provider omitted a coordinate");
        return None;
    };
    let (Some(latitude), Some(longitude)) = (lat.value(), lon.value()) else {
        warn!("{label}: unparseable coordinate {lat:?},{lon:?}");
        return None;
    };
    match Coordinate::new(latitude, longitude) {
        Ok(coordinate) => Some(coordinate),
        Err(err) => {
            warn!("{label}: {err}");
            None
        }
    }
}

/// Turn an autocomplete item into a candidate.
///
/// The label is the full display name, falling back to the OSM type.
pub(crate) fn convert_suggestion(item: AutocompleteItem) -> Candidate {
    let label = item
        .display_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| item.kind.clone())
        .unwrap_or_else(|| "Address".to_owned());
    let coordinate = coordinate_from(item.lat.as_ref(), item.lon.as_ref(), &label);
    let mut candidate = Candidate::new(label, coordinate);
    if let Some(category) = item.kind.or(item.class) {
        candidate = candidate.with_category(category);
    }
    if let Some(id) = item.place_id {
        candidate = candidate.with_source_id(id.to_string());
    }
    candidate
}

/// Turn a nearby place into a candidate labelled `name`, then `type`, then `"POI"`.
pub(crate) fn convert_place(place: NearbyPlace) -> Candidate {
    let label = place
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| place.kind.clone())
        .unwrap_or_else(|| "POI".to_owned());
    let coordinate = coordinate_from(place.lat.as_ref(), place.lon.as_ref(), &label);
    let mut candidate = Candidate::new(label, coordinate);
    if let Some(category) = place.kind.or(place.class) {
        candidate = candidate.with_category(category);
    }
    if let Some(id) = place.osm_id.or(place.place_id) {
        candidate = candidate.with_source_id(id.to_string());
    }
    candidate
}

/// Turn a directions response into a [`Route`] from `from` to `to`.
pub(crate) fn convert_directions(
    from: Coordinate,
    to: Coordinate,
    response: DirectionsResponse,
) -> Result<Route, ProviderError> {
    if !response.is_ok() {
        return Err(ProviderError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let Some(best) = response.routes.into_iter().next() else {
        return Err(ProviderError::ServiceError {
            code: "NoRoute".to_owned(),
            message: "directions response contained no routes".to_owned(),
        });
    };

    let path = best
        .geometry
        .map(|geometry| {
            geometry
                .coordinates
                .into_iter()
                .map(|[longitude, latitude]| Coordinate {
                    latitude,
                    longitude,
                })
                .collect()
        })
        .unwrap_or_default();

    Route::new(from, to, path, best.distance).map_err(|err| ProviderError::ParseError {
        message: err.to_string(),
    })
}
