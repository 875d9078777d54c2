//! Commands backed by the LocationIQ service: `search`, `nearby` and `route`.
//!
//! Each command drives a [`ProximitySession`] through the same ticketed
//! request/apply cycle an interactive host would use.

use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;
use vicinity_core::{
    Candidate, Coordinate, DEFAULT_POI_RADIUS_M, PoiProvider, ProximitySession, RouteProvider,
    SessionConfig, SuggestionProvider,
};
use vicinity_data::locationiq::{LocationIqClient, LocationIqConfig};

use crate::{
    ARG_API_KEY, ARG_BASE_URL, ARG_DESTINATION, ARG_QUERY, ARG_RADIUS, ARG_REFERENCE,
    ARG_TIMEOUT_SECS, CliError, ENV_NEARBY_API_KEY, ENV_NEARBY_REFERENCE, ENV_ROUTE_API_KEY,
    ENV_ROUTE_DESTINATION, ENV_ROUTE_REFERENCE, ENV_SEARCH_API_KEY, ENV_SEARCH_QUERY,
    parse_coordinate, parse_optional_coordinate, require_radius, write_json,
};

/// Label given to the `route` destination when none is supplied.
const DEFAULT_DESTINATION_LABEL: &str = "Destination";

/// Connection settings shared by the lookup commands.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ServiceConfig {
    pub(crate) api_key: String,
    pub(crate) base_url: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ServiceConfig {
    /// Build from merged command options; `env` names the variable that
    /// supplies the key for this command.
    fn resolve(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
        env: &'static str,
    ) -> Result<Self, CliError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_API_KEY,
                env,
            })?;
        Ok(Self {
            api_key,
            base_url,
            timeout: timeout_secs.map(Duration::from_secs),
        })
    }

    /// LocationIQ settings; `base_url` overrides both API hosts.
    pub(crate) fn locationiq(&self) -> LocationIqConfig {
        let mut config = LocationIqConfig::new(self.api_key.clone());
        if let Some(base_url) = &self.base_url {
            config = config
                .with_base_url(base_url.clone())
                .with_autocomplete_base_url(base_url.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }
}

/// Everything the lookup commands need from a location service.
pub(crate) trait LocationServices: SuggestionProvider + PoiProvider + RouteProvider {}

impl<T: SuggestionProvider + PoiProvider + RouteProvider> LocationServices for T {}

/// Builds the location service for the current invocation.
pub(crate) trait ServicesBuilder {
    fn build(&self, config: &ServiceConfig) -> Result<Box<dyn LocationServices>, CliError>;
}

pub(crate) struct LocationIqServicesBuilder;

impl ServicesBuilder for LocationIqServicesBuilder {
    fn build(&self, config: &ServiceConfig) -> Result<Box<dyn LocationServices>, CliError> {
        let client = LocationIqClient::with_config(config.locationiq())?;
        Ok(Box::new(client))
    }
}

// --- search ---

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Send free text to the autocomplete service and print the \
                 suggestions, nearest first when a reference location is \
                 given. Queries shorter than three characters are not sent. \
                 A failed lookup is logged and prints an empty list.",
    about = "Search addresses"
)]
#[ortho_config(prefix = "VICINITY")]
pub(crate) struct SearchArgs {
    /// Free-text address query.
    #[arg(value_name = "text")]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Reference location as `lat,lon`.
    #[arg(long = ARG_REFERENCE, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) reference: Option<String>,
    /// LocationIQ access token.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Override the LocationIQ base URL.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchConfig {
    pub(crate) query: String,
    pub(crate) reference: Option<Coordinate>,
    pub(crate) service: ServiceConfig,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let query = args.query.ok_or(CliError::MissingArgument {
            field: ARG_QUERY,
            env: ENV_SEARCH_QUERY,
        })?;
        let reference = parse_optional_coordinate(ARG_REFERENCE, args.reference.as_deref())?;
        let service = ServiceConfig::resolve(
            args.api_key,
            args.base_url,
            args.timeout_secs,
            ENV_SEARCH_API_KEY,
        )?;
        Ok(Self {
            query,
            reference,
            service,
        })
    }
}

pub(crate) fn run_search_with(
    args: SearchArgs,
    builder: &dyn ServicesBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let suggestions = execute_search(&config, builder)?;
    write_json(writer, &suggestions)
}

pub(crate) fn execute_search(
    config: &SearchConfig,
    builder: &dyn ServicesBuilder,
) -> Result<Vec<Candidate>, CliError> {
    let mut session = ProximitySession::default();
    if let Some(reference) = config.reference {
        session.set_reference(reference);
    }
    let Some(ticket) = session.begin_query(&config.query) else {
        debug!("query {:?} is too short to search", config.query);
        return Ok(Vec::new());
    };
    let services = builder.build(&config.service)?;
    let found = services.search_suggestions(ticket.query());
    let ranked = session.apply_suggestions(&ticket, found)?;
    Ok(ranked.to_vec())
}

// --- nearby ---

/// CLI arguments for the `nearby` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List amenities around a reference location, nearest first. \
                 Places farther than the radius are dropped. A failed \
                 lookup is logged and prints an empty list.",
    about = "List nearby points of interest"
)]
#[ortho_config(prefix = "VICINITY")]
pub(crate) struct NearbyArgs {
    /// Reference location as `lat,lon`.
    #[arg(long = ARG_REFERENCE, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) reference: Option<String>,
    /// Search radius in metres (default 800).
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// LocationIQ access token.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Override the LocationIQ base URL.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl NearbyArgs {
    pub(crate) fn into_config(self) -> Result<NearbyConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NearbyConfig::try_from(merged)
    }
}

/// Resolved `nearby` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyConfig {
    pub(crate) reference: Coordinate,
    pub(crate) radius_m: f64,
    pub(crate) service: ServiceConfig,
}

impl TryFrom<NearbyArgs> for NearbyConfig {
    type Error = CliError;

    fn try_from(args: NearbyArgs) -> Result<Self, Self::Error> {
        let reference = args.reference.ok_or(CliError::MissingArgument {
            field: ARG_REFERENCE,
            env: ENV_NEARBY_REFERENCE,
        })?;
        let reference = parse_coordinate(ARG_REFERENCE, &reference)?;
        let radius_m = require_radius(ARG_RADIUS, args.radius.unwrap_or(DEFAULT_POI_RADIUS_M))?;
        let service = ServiceConfig::resolve(
            args.api_key,
            args.base_url,
            args.timeout_secs,
            ENV_NEARBY_API_KEY,
        )?;
        Ok(Self {
            reference,
            radius_m,
            service,
        })
    }
}

pub(crate) fn run_nearby_with(
    args: NearbyArgs,
    builder: &dyn ServicesBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let pois = execute_nearby(&config, builder)?;
    write_json(writer, &pois)
}

pub(crate) fn execute_nearby(
    config: &NearbyConfig,
    builder: &dyn ServicesBuilder,
) -> Result<Vec<Candidate>, CliError> {
    let mut session =
        ProximitySession::new(SessionConfig::default().with_poi_radius_m(config.radius_m));
    session.set_reference(config.reference);
    let Some(ticket) = session.begin_poi_fetch() else {
        return Ok(Vec::new());
    };
    let services = builder.build(&config.service)?;
    let found = services.nearby_pois(ticket.reference(), ticket.radius_m());
    let ranked = session.apply_pois(&ticket, found)?;
    Ok(ranked.to_vec())
}

// --- route ---

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Select a destination, request a driving route to it and \
                 print the session view. The displayed distance is the \
                 routed length, or the straight-line distance when routing \
                 fails.",
    about = "Route to a destination"
)]
#[ortho_config(prefix = "VICINITY")]
pub(crate) struct RouteArgs {
    /// Destination as `lat,lon`.
    #[arg(long = ARG_DESTINATION, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) destination: Option<String>,
    /// Destination label shown in the output.
    #[arg(long = "label", value_name = "text")]
    #[serde(default)]
    pub(crate) label: Option<String>,
    /// Reference location as `lat,lon`.
    #[arg(long = ARG_REFERENCE, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) reference: Option<String>,
    /// LocationIQ access token.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Override the LocationIQ base URL.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RouteConfig {
    pub(crate) reference: Coordinate,
    pub(crate) destination: Candidate,
    pub(crate) service: ServiceConfig,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let reference = args.reference.ok_or(CliError::MissingArgument {
            field: ARG_REFERENCE,
            env: ENV_ROUTE_REFERENCE,
        })?;
        let reference = parse_coordinate(ARG_REFERENCE, &reference)?;
        let destination = args.destination.ok_or(CliError::MissingArgument {
            field: ARG_DESTINATION,
            env: ENV_ROUTE_DESTINATION,
        })?;
        let target = parse_coordinate(ARG_DESTINATION, &destination)?;
        let label = args
            .label
            .unwrap_or_else(|| DEFAULT_DESTINATION_LABEL.to_owned());
        let service = ServiceConfig::resolve(
            args.api_key,
            args.base_url,
            args.timeout_secs,
            ENV_ROUTE_API_KEY,
        )?;
        Ok(Self {
            reference,
            destination: Candidate::new(label, Some(target)),
            service,
        })
    }
}

pub(crate) fn run_route_with(
    args: RouteArgs,
    builder: &dyn ServicesBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let session = execute_route(&config, builder)?;
    write_json(writer, &session.view())
}

/// Select the destination and attach a route when the service provides one.
///
/// A routing failure leaves the straight-line distance in place.
pub(crate) fn execute_route(
    config: &RouteConfig,
    builder: &dyn ServicesBuilder,
) -> Result<ProximitySession, CliError> {
    let mut session = ProximitySession::default();
    session.set_reference(config.reference);
    let Some(ticket) = session.select_suggestion(&config.destination) else {
        return Ok(session);
    };
    let services = builder.build(&config.service)?;
    let outcome = services.route(ticket.origin(), ticket.target());
    session.apply_route(&ticket, outcome)?;
    Ok(session)
}

#[cfg(test)]
pub(crate) fn nearby_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<NearbyConfig, CliError> {
    let merged = NearbyArgs::merge_from_layers(layers).map_err(CliError::from)?;
    NearbyConfig::try_from(merged)
}
