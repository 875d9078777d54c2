//! Command-line interface for the Vicinity proximity engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use vicinity_core::Coordinate;

mod error;
mod fs;
mod lookup;
mod offline;

pub use error::CliError;

use lookup::{NearbyArgs, RouteArgs, SearchArgs};
use offline::{DistanceArgs, RankArgs};

const ARG_FROM: &str = "from";
const ARG_TO: &str = "to";
const ARG_CANDIDATES: &str = "candidates";
const ARG_REFERENCE: &str = "reference";
const ARG_RADIUS: &str = "radius";
const ARG_QUERY: &str = "query";
const ARG_DESTINATION: &str = "destination";
const ARG_API_KEY: &str = "api-key";
const ARG_BASE_URL: &str = "base-url";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ENV_RANK_CANDIDATES: &str = "VICINITY_CMDS_RANK_CANDIDATES";
const ENV_SEARCH_QUERY: &str = "VICINITY_CMDS_SEARCH_QUERY";
const ENV_NEARBY_REFERENCE: &str = "VICINITY_CMDS_NEARBY_REFERENCE";
const ENV_ROUTE_REFERENCE: &str = "VICINITY_CMDS_ROUTE_REFERENCE";
const ENV_ROUTE_DESTINATION: &str = "VICINITY_CMDS_ROUTE_DESTINATION";
const ENV_SEARCH_API_KEY: &str = "VICINITY_CMDS_SEARCH_API_KEY";
const ENV_NEARBY_API_KEY: &str = "VICINITY_CMDS_NEARBY_API_KEY";
const ENV_ROUTE_API_KEY: &str = "VICINITY_CMDS_ROUTE_API_KEY";

/// Run the Vicinity CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    let builder = lookup::LocationIqServicesBuilder;
    match cli.command {
        Command::Distance(args) => offline::run_distance_with(&args, &mut stdout),
        Command::Rank(args) => offline::run_rank_with(args, &mut stdout),
        Command::Search(args) => lookup::run_search_with(args, &builder, &mut stdout),
        Command::Nearby(args) => lookup::run_nearby_with(args, &builder, &mut stdout),
        Command::Route(args) => lookup::run_route_with(args, &builder, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "vicinity",
    about = "Rank places by distance and reconcile routed distances",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Great-circle distance between two coordinates.
    Distance(DistanceArgs),
    /// Rank a JSON file of candidates around a reference location.
    Rank(RankArgs),
    /// Search addresses and rank the suggestions.
    Search(SearchArgs),
    /// List points of interest around a reference location.
    Nearby(NearbyArgs),
    /// Route to a destination and report the reconciled distance.
    Route(RouteArgs),
}

/// Parse a `lat,lon` pair such as `-34.6037,-58.3816`.
fn parse_coordinate(field: &'static str, value: &str) -> Result<Coordinate, CliError> {
    let malformed = || CliError::MalformedCoordinate {
        field,
        value: value.to_owned(),
    };
    let (lat, lon) = value.split_once(',').ok_or_else(malformed)?;
    let latitude: f64 = lat.trim().parse().map_err(|_| malformed())?;
    let longitude: f64 = lon.trim().parse().map_err(|_| malformed())?;
    Coordinate::new(latitude, longitude).map_err(|source| CliError::InvalidCoordinate {
        field,
        value: value.to_owned(),
        source,
    })
}

fn parse_optional_coordinate(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<Coordinate>, CliError> {
    value.map(|text| parse_coordinate(field, text)).transpose()
}

fn require_radius(field: &'static str, value: f64) -> Result<f64, CliError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CliError::InvalidRadius { field, value })
    }
}

/// Write `value` as pretty JSON followed by a newline.
fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
