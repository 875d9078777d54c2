//! Test helpers: UTF-8 temp files and a canned location service.

use crate::CliError;
use crate::lookup::{LocationServices, ServiceConfig, ServicesBuilder};
use camino::Utf8Path;
use std::cell::Cell;
use vicinity_core::{
    Candidate, Coordinate, PoiProvider, ProviderError, Route, RouteProvider, SuggestionProvider,
};

pub(super) const OBELISCO: Coordinate = Coordinate {
    latitude: -34.6037,
    longitude: -58.3816,
};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
}

pub(super) fn north_of_obelisco(label: &str, d_lat: f64) -> Candidate {
    Candidate::new(
        label,
        Some(Coordinate {
            latitude: OBELISCO.latitude + d_lat,
            longitude: OBELISCO.longitude,
        }),
    )
}

/// Location service answering every request from canned data.
#[derive(Debug, Clone, Default)]
pub(super) struct StubServices {
    pub(super) suggestions: Vec<Candidate>,
    pub(super) pois: Vec<Candidate>,
    pub(super) route_length_m: Option<f64>,
    /// Fail search and nearby lookups as if the network were down.
    pub(super) offline: bool,
}

impl StubServices {
    fn unreachable(&self) -> Result<(), ProviderError> {
        if self.offline {
            return Err(ProviderError::NetworkError {
                url: "http://stub.invalid/".to_owned(),
                message: "connection refused".to_owned(),
            });
        }
        Ok(())
    }
}

impl SuggestionProvider for StubServices {
    fn search_suggestions(&self, _query: &str) -> Result<Vec<Candidate>, ProviderError> {
        self.unreachable()?;
        Ok(self.suggestions.clone())
    }
}

impl PoiProvider for StubServices {
    fn nearby_pois(
        &self,
        _reference: Coordinate,
        _radius_m: f64,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.unreachable()?;
        Ok(self.pois.clone())
    }
}

impl RouteProvider for StubServices {
    fn route(&self, from: Coordinate, to: Coordinate) -> Result<Route, ProviderError> {
        let Some(length_m) = self.route_length_m else {
            return Err(ProviderError::ServiceError {
                code: "NoRoute".to_owned(),
                message: "stub has no route".to_owned(),
            });
        };
        Route::new(from, to, vec![from, to], length_m).map_err(|err| ProviderError::ParseError {
            message: err.to_string(),
        })
    }
}

/// Hands out clones of a [`StubServices`] and counts how often it was asked.
#[derive(Debug, Default)]
pub(super) struct StubBuilder {
    pub(super) services: StubServices,
    pub(super) builds: Cell<usize>,
}

impl StubBuilder {
    pub(super) fn new(services: StubServices) -> Self {
        Self {
            services,
            builds: Cell::new(0),
        }
    }
}

impl ServicesBuilder for StubBuilder {
    fn build(&self, _config: &ServiceConfig) -> Result<Box<dyn LocationServices>, CliError> {
        self.builds.set(self.builds.get() + 1);
        Ok(Box::new(self.services.clone()))
    }
}
