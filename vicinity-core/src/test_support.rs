//! Deterministic provider stubs used by unit and behaviour tests.

use std::cell::RefCell;

use crate::{
    Candidate, Coordinate, PoiProvider, ProviderError, ReferenceProvider, Route, RouteProvider,
    SuggestionProvider,
};

/// `ReferenceProvider` returning a fixed outcome.
#[derive(Debug, Clone)]
pub struct FixedReference(Result<Coordinate, ProviderError>);

impl FixedReference {
    /// Always report `coordinate`.
    pub fn at(coordinate: Coordinate) -> Self {
        Self(Ok(coordinate))
    }

    /// Always report that positioning was denied.
    pub fn denied() -> Self {
        Self(Err(ProviderError::ReferenceUnavailable {
            reason: "permission denied".to_owned(),
        }))
    }
}

impl ReferenceProvider for FixedReference {
    fn current_reference(&self) -> Result<Coordinate, ProviderError> {
        self.0.clone()
    }
}

/// Search and POI provider returning canned candidate lists.
///
/// Records every query and lookup centre it receives.
#[derive(Debug, Default)]
pub struct StubCandidates {
    outcome: Option<Result<Vec<Candidate>, ProviderError>>,
    queries: RefCell<Vec<String>>,
    lookups: RefCell<Vec<(Coordinate, f64)>>,
}

impl StubCandidates {
    /// Return `candidates` for every request.
    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            outcome: Some(Ok(candidates)),
            ..Self::default()
        }
    }

    /// Fail every request with `error`.
    pub fn with_error(error: ProviderError) -> Self {
        Self {
            outcome: Some(Err(error)),
            ..Self::default()
        }
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    /// POI lookups received so far.
    pub fn lookups(&self) -> Vec<(Coordinate, f64)> {
        self.lookups.borrow().clone()
    }

    fn outcome(&self) -> Result<Vec<Candidate>, ProviderError> {
        self.outcome.clone().unwrap_or_else(|| Ok(Vec::new()))
    }
}

impl SuggestionProvider for StubCandidates {
    fn search_suggestions(&self, query: &str) -> Result<Vec<Candidate>, ProviderError> {
        self.queries.borrow_mut().push(query.to_owned());
        self.outcome()
    }
}

impl PoiProvider for StubCandidates {
    fn nearby_pois(
        &self,
        reference: Coordinate,
        radius_m: f64,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.lookups.borrow_mut().push((reference, radius_m));
        self.outcome()
    }
}

/// `RouteProvider` drawing a straight two-vertex path.
///
/// The length is the straight-line distance scaled by `detour`, so routed
/// figures are distinguishable from straight-line ones in assertions.
#[derive(Debug, Clone, Copy)]
pub struct StraightRouteProvider {
    /// Multiplier applied to the straight-line length.
    pub detour: f64,
}

impl Default for StraightRouteProvider {
    fn default() -> Self {
        Self { detour: 1.25 }
    }
}

impl RouteProvider for StraightRouteProvider {
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<Route, ProviderError> {
        let straight = Route::from_path(from, to, vec![from, to]).map_err(|err| {
            ProviderError::ParseError {
                message: err.to_string(),
            }
        })?;
        Route::new(from, to, straight.path, straight.length_m * self.detour).map_err(|err| {
            ProviderError::ParseError {
                message: err.to_string(),
            }
        })
    }
}

/// `RouteProvider` that always fails.
#[derive(Debug, Clone)]
pub struct FailingRouteProvider(pub ProviderError);

impl RouteProvider for FailingRouteProvider {
    fn route(&self, _from: Coordinate, _to: Coordinate) -> Result<Route, ProviderError> {
        Err(self.0.clone())
    }
}
