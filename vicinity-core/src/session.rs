//! Coordination of the reference location, candidate lists and destination.
//!
//! A [`ProximitySession`] is the single owner of everything the presentation
//! layer renders. Asynchronous fetches are modelled as ticketed requests: a
//! `begin_*` call returns a ticket tagged with the generation of the state it
//! depends on, and the matching `apply_*` call rejects the result with
//! [`SessionError::StaleResult`] when that state has moved on. Stale results
//! leave the session untouched.
//!
//! Hosts with several I/O threads should keep the session on one coordinating
//! task or behind a single mutex, since reconciliation reads the reference and
//! the destination together.

use log::{debug, warn};
use thiserror::Error;

use crate::{
    ActiveDestination, Candidate, Coordinate, Destination, DestinationKind, Generation,
    PoiProvider, ProviderError, ReferenceProvider, Route, RouteProvider, SuggestionProvider,
    rank, rank_within,
};

/// Queries shorter than this many characters do not hit the search provider.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 3;

/// Radius used for nearby POI lookups, roughly ten city blocks.
pub const DEFAULT_POI_RADIUS_M: f64 = 800.0;

/// Label given to a destination placed at the reference location.
pub const CURRENT_LOCATION_LABEL: &str = "Current location";

/// Tunables for a [`ProximitySession`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Minimum query length, in characters, before searching.
    pub min_query_chars: usize,
    /// Radius for nearby POI lookups, in metres.
    pub poi_radius_m: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            poi_radius_m: DEFAULT_POI_RADIUS_M,
        }
    }
}

impl SessionConfig {
    /// Set the minimum query length.
    #[must_use]
    pub const fn with_min_query_chars(mut self, min_query_chars: usize) -> Self {
        self.min_query_chars = min_query_chars;
        self
    }

    /// Set the POI lookup radius.
    #[must_use]
    pub const fn with_poi_radius_m(mut self, poi_radius_m: f64) -> Self {
        self.poi_radius_m = poi_radius_m;
        self
    }
}

/// Which kind of asynchronous result was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Autocomplete suggestions.
    Suggestions,
    /// Nearby points of interest.
    Pois,
    /// A driving route.
    Route,
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Suggestions => "suggestions",
            Self::Pois => "points of interest",
            Self::Route => "route",
        })
    }
}

/// Errors returned by the session's `apply_*` and `refresh_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The result belongs to a superseded query, reference or destination.
    #[error("discarded stale {kind} result")]
    StaleResult {
        /// What kind of result was discarded.
        kind: ResultKind,
    },
}

/// Handle for an in-flight autocomplete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    generation: Generation,
    query: String,
}

impl QueryTicket {
    /// The text to search for.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Handle for an in-flight nearby-POI request.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiTicket {
    generation: Generation,
    reference: Coordinate,
    radius_m: f64,
}

impl PoiTicket {
    /// Centre of the lookup.
    #[must_use]
    pub const fn reference(&self) -> Coordinate {
        self.reference
    }

    /// Radius of the lookup in metres.
    #[must_use]
    pub const fn radius_m(&self) -> f64 {
        self.radius_m
    }
}

/// Handle for an in-flight route request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTicket {
    destination: Generation,
    reference: Generation,
    from: Coordinate,
    to: Coordinate,
}

impl RouteTicket {
    /// Route origin: the reference location at request time.
    #[must_use]
    pub const fn origin(&self) -> Coordinate {
        self.from
    }

    /// Route target: the destination at request time.
    #[must_use]
    pub const fn target(&self) -> Coordinate {
        self.to
    }
}

/// Immutable snapshot of a session for rendering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SessionView {
    /// Current reference location.
    pub reference: Option<Coordinate>,
    /// Current search text.
    pub query: String,
    /// Ranked autocomplete suggestions.
    pub suggestions: Vec<Candidate>,
    /// Ranked nearby POIs; empty while a destination is active.
    pub pois: Vec<Candidate>,
    /// The active destination.
    pub destination: Option<Destination>,
    /// Route to the active destination.
    pub route: Option<Route>,
    /// Straight-line distance to the destination in metres.
    pub straight_line_m: Option<f64>,
    /// Routed distance to the destination in metres.
    pub routed_m: Option<f64>,
    /// Distance to display: routed when known, else straight-line.
    pub active_distance_m: Option<f64>,
}

/// Single owner of the reference location, candidate lists and destination.
///
/// # Examples
/// ```
/// use vicinity_core::{Candidate, Coordinate, ProximitySession};
///
/// let mut session = ProximitySession::default();
/// session.set_reference(Coordinate { latitude: 0.0, longitude: 0.0 });
///
/// let ticket = session.begin_query("plaza").expect("long enough to search");
/// let results = vec![
///     Candidate::new("far", Some(Coordinate { latitude: 0.1, longitude: 0.0 })),
///     Candidate::new("near", Some(Coordinate { latitude: 0.01, longitude: 0.0 })),
/// ];
/// let ranked = session.apply_suggestions(&ticket, Ok(results)).expect("fresh ticket");
/// assert_eq!(ranked[0].label, "near");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProximitySession {
    config: SessionConfig,
    reference: Option<Coordinate>,
    reference_generation: Generation,
    query: String,
    query_generation: Generation,
    raw_suggestions: Vec<Candidate>,
    suggestions: Vec<Candidate>,
    raw_pois: Vec<Candidate>,
    pois: Vec<Candidate>,
    destination: ActiveDestination,
}

impl ProximitySession {
    /// Create a session with explicit configuration.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current reference location.
    #[must_use]
    pub const fn reference(&self) -> Option<Coordinate> {
        self.reference
    }

    /// Ranked suggestions for the current query.
    #[must_use]
    pub fn suggestions(&self) -> &[Candidate] {
        &self.suggestions
    }

    /// Ranked nearby POIs from the latest lookup.
    #[must_use]
    pub fn pois(&self) -> &[Candidate] {
        &self.pois
    }

    /// Destination state and route.
    #[must_use]
    pub const fn destination(&self) -> &ActiveDestination {
        &self.destination
    }

    // --- reference location ---

    /// Replace the reference location.
    ///
    /// Candidate lists are re-ranked from their provider order and any route
    /// is dropped, since it started somewhere else. Setting the same
    /// coordinate again changes nothing.
    pub fn set_reference(&mut self, coordinate: Coordinate) -> Generation {
        if self.reference == Some(coordinate) {
            return self.reference_generation;
        }
        self.reference = Some(coordinate);
        self.reference_moved()
    }

    /// Forget the reference location after positioning failed.
    ///
    /// Lists fall back to provider order and distances disappear.
    pub fn reference_unavailable(&mut self) -> Generation {
        self.reference = None;
        self.reference_moved()
    }

    fn reference_moved(&mut self) -> Generation {
        let generation = self.reference_generation.advance();
        self.suggestions = rank(self.reference, &self.raw_suggestions);
        self.pois = rank_within(self.reference, &self.raw_pois, self.config.poi_radius_m);
        self.destination.drop_route();
        debug!("reference {generation}: {:?}", self.reference);
        generation
    }

    /// Ask `provider` for the reference location and store the outcome.
    ///
    /// # Errors
    ///
    /// Returns the provider error after degrading the session to having no
    /// reference.
    pub fn refresh_reference(
        &mut self,
        provider: &dyn ReferenceProvider,
    ) -> Result<Coordinate, ProviderError> {
        match provider.current_reference() {
            Ok(coordinate) => {
                self.set_reference(coordinate);
                Ok(coordinate)
            }
            Err(err) => {
                warn!("reference location unavailable: {err}");
                self.reference_unavailable();
                Err(err)
            }
        }
    }

    // --- autocomplete ---

    /// Record new search text and open a request for it.
    ///
    /// Returns `None`, and clears the suggestions, when the text is shorter
    /// than [`SessionConfig::min_query_chars`]. Either way any request opened
    /// for earlier text becomes stale.
    pub fn begin_query(&mut self, text: &str) -> Option<QueryTicket> {
        text.clone_into(&mut self.query);
        let generation = self.query_generation.advance();
        if text.chars().count() < self.config.min_query_chars {
            self.clear_suggestions();
            return None;
        }
        Some(QueryTicket {
            generation,
            query: text.to_owned(),
        })
    }

    /// Apply an autocomplete result.
    ///
    /// A fetch failure yields an empty list.
    ///
    /// # Errors
    ///
    /// [`SessionError::StaleResult`] when newer text was entered, or a
    /// selection was made, after the ticket was issued.
    pub fn apply_suggestions(
        &mut self,
        ticket: &QueryTicket,
        result: Result<Vec<Candidate>, ProviderError>,
    ) -> Result<&[Candidate], SessionError> {
        if ticket.generation != self.query_generation {
            debug!("dropping suggestions for {:?}", ticket.query);
            return Err(SessionError::StaleResult {
                kind: ResultKind::Suggestions,
            });
        }
        self.raw_suggestions = result.unwrap_or_else(|err| {
            warn!("suggestion fetch for {:?} failed: {err}", ticket.query);
            Vec::new()
        });
        self.suggestions = rank(self.reference, &self.raw_suggestions);
        Ok(&self.suggestions)
    }

    /// Search `text` through `provider` and apply the result.
    ///
    /// # Errors
    ///
    /// See [`Self::apply_suggestions`].
    pub fn refresh_suggestions(
        &mut self,
        text: &str,
        provider: &dyn SuggestionProvider,
    ) -> Result<&[Candidate], SessionError> {
        let Some(ticket) = self.begin_query(text) else {
            return Ok(&self.suggestions);
        };
        let result = provider.search_suggestions(ticket.query());
        self.apply_suggestions(&ticket, result)
    }

    fn clear_suggestions(&mut self) {
        self.raw_suggestions.clear();
        self.suggestions.clear();
    }

    // --- nearby POIs ---

    /// Open a nearby-POI request around the current reference.
    ///
    /// Returns `None` without a reference or while a destination is active,
    /// since POIs are only offered when nothing is selected.
    pub fn begin_poi_fetch(&self) -> Option<PoiTicket> {
        if self.destination.destination().is_some() {
            return None;
        }
        Some(PoiTicket {
            generation: self.reference_generation,
            reference: self.reference?,
            radius_m: self.config.poi_radius_m,
        })
    }

    /// Apply a nearby-POI result.
    ///
    /// Candidates beyond the ticket's radius are dropped; a fetch failure
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// [`SessionError::StaleResult`] when the reference moved after the
    /// ticket was issued.
    pub fn apply_pois(
        &mut self,
        ticket: &PoiTicket,
        result: Result<Vec<Candidate>, ProviderError>,
    ) -> Result<&[Candidate], SessionError> {
        if ticket.generation != self.reference_generation {
            debug!("dropping POIs fetched around {}", ticket.reference);
            return Err(SessionError::StaleResult {
                kind: ResultKind::Pois,
            });
        }
        self.raw_pois = result.unwrap_or_else(|err| {
            warn!("POI fetch around {} failed: {err}", ticket.reference);
            Vec::new()
        });
        self.pois = rank_within(self.reference, &self.raw_pois, ticket.radius_m);
        Ok(&self.pois)
    }

    /// Look up POIs through `provider` and apply the result.
    ///
    /// Does nothing when [`Self::begin_poi_fetch`] would return `None`.
    ///
    /// # Errors
    ///
    /// See [`Self::apply_pois`].
    pub fn refresh_pois(&mut self, provider: &dyn PoiProvider) -> Result<&[Candidate], SessionError> {
        let Some(ticket) = self.begin_poi_fetch() else {
            return Ok(&self.pois);
        };
        let result = provider.nearby_pois(ticket.reference, ticket.radius_m);
        self.apply_pois(&ticket, result)
    }

    // --- destination selection ---

    /// Make a suggestion the destination.
    ///
    /// The suggestion list is closed and the query text becomes the
    /// suggestion's label. An active point of interest is dropped either way.
    /// A suggestion without a usable coordinate cannot be routed to and
    /// leaves a free-text destination unchanged. Returns a route ticket when
    /// both ends are known.
    pub fn select_suggestion(&mut self, candidate: &Candidate) -> Option<RouteTicket> {
        candidate.label.clone_into(&mut self.query);
        self.close_search();
        let Some(coordinate) = candidate.usable_coordinate() else {
            warn!("suggestion {:?} has no coordinate; not selectable", candidate.label);
            if self.destination.kind() == Some(DestinationKind::PointOfInterest) {
                self.destination.clear();
            }
            return None;
        };
        self.destination
            .select_free_text(coordinate, Some(candidate.label.clone()));
        self.begin_route()
    }

    /// Make a point of interest the destination.
    ///
    /// Clears the search text. A POI without a usable coordinate leaves the
    /// destination unchanged.
    pub fn select_poi(&mut self, candidate: &Candidate) -> Option<RouteTicket> {
        self.query.clear();
        self.close_search();
        let Some(coordinate) = candidate.usable_coordinate() else {
            warn!("POI {:?} has no coordinate; not selectable", candidate.label);
            return None;
        };
        self.destination
            .select_poi(coordinate, Some(candidate.label.clone()));
        self.begin_route()
    }

    /// Make the reference location itself the destination.
    pub fn select_current_location(&mut self) -> Option<RouteTicket> {
        let here = self.reference?;
        self.query = here.to_string();
        self.close_search();
        self.destination
            .select_free_text(here, Some(CURRENT_LOCATION_LABEL.to_owned()));
        self.begin_route()
    }

    /// Drop the destination, its route and the search text.
    pub fn clear(&mut self) {
        self.query.clear();
        self.close_search();
        self.destination.clear();
    }

    fn close_search(&mut self) {
        self.query_generation.advance();
        self.clear_suggestions();
    }

    // --- routing ---

    /// Open a route request from the reference to the destination.
    pub fn begin_route(&self) -> Option<RouteTicket> {
        let from = self.reference?;
        let to = self.destination.destination()?.coordinate;
        Some(RouteTicket {
            destination: self.destination.generation(),
            reference: self.reference_generation,
            from,
            to,
        })
    }

    /// Apply a routing result.
    ///
    /// A fetch failure leaves the destination without a route.
    ///
    /// # Errors
    ///
    /// [`SessionError::StaleResult`] when the destination or reference changed
    /// after the ticket was issued, or the route does not connect the
    /// ticket's endpoints.
    pub fn apply_route(
        &mut self,
        ticket: &RouteTicket,
        result: Result<Route, ProviderError>,
    ) -> Result<Option<&Route>, SessionError> {
        let stale = SessionError::StaleResult {
            kind: ResultKind::Route,
        };
        if ticket.destination != self.destination.generation()
            || ticket.reference != self.reference_generation
        {
            debug!("dropping route to {}", ticket.to);
            return Err(stale);
        }
        match result {
            Ok(route) => {
                if !route.connects(ticket.from, ticket.to) {
                    warn!("route does not connect {} and {}", ticket.from, ticket.to);
                    return Err(stale);
                }
                self.destination.attach_route(route).map_err(|err| {
                    debug!("route rejected: {err}");
                    stale
                })?;
            }
            Err(err) => {
                warn!("route fetch to {} failed: {err}", ticket.to);
                self.destination.drop_route();
            }
        }
        Ok(self.destination.route())
    }

    /// Fetch a route through `provider` and apply it.
    ///
    /// Returns `Ok(None)` when no route can be requested.
    ///
    /// # Errors
    ///
    /// See [`Self::apply_route`].
    pub fn refresh_route(
        &mut self,
        provider: &dyn RouteProvider,
    ) -> Result<Option<&Route>, SessionError> {
        let Some(ticket) = self.begin_route() else {
            return Ok(None);
        };
        let result = provider.route(ticket.from, ticket.to);
        self.apply_route(&ticket, result)
    }

    // --- presentation ---

    /// Snapshot the session for rendering.
    #[must_use]
    pub fn view(&self) -> SessionView {
        let destination = self.destination.destination().cloned();
        let pois = if destination.is_some() {
            Vec::new()
        } else {
            self.pois.clone()
        };
        let straight_line_m = self.destination.straight_line_distance(self.reference);
        let routed_m = self.destination.routed_distance();
        SessionView {
            reference: self.reference,
            query: self.query.clone(),
            suggestions: self.suggestions.clone(),
            pois,
            destination,
            route: self.destination.route().cloned(),
            straight_line_m,
            routed_m,
            active_distance_m: crate::active_distance(straight_line_m, routed_m),
        }
    }
}
