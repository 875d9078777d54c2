//! Commands that need no network access: `distance` and `rank`.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use vicinity_core::{Candidate, Coordinate, haversine_distance, rank, rank_within};

use crate::{
    ARG_CANDIDATES, ARG_FROM, ARG_RADIUS, ARG_REFERENCE, ARG_TO, CliError, ENV_RANK_CANDIDATES,
    fs, parse_coordinate, parse_optional_coordinate, require_radius, write_json,
};

/// CLI arguments for the `distance` subcommand.
#[derive(Debug, Clone, Parser)]
pub(crate) struct DistanceArgs {
    /// Start point as `lat,lon`.
    #[arg(value_name = "lat,lon", allow_hyphen_values = true)]
    pub(crate) from: String,
    /// End point as `lat,lon`.
    #[arg(value_name = "lat,lon", allow_hyphen_values = true)]
    pub(crate) to: String,
}

#[derive(Debug, Serialize)]
struct DistanceOutput {
    from: Coordinate,
    to: Coordinate,
    meters: f64,
}

pub(crate) fn run_distance_with(
    args: &DistanceArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let from = parse_coordinate(ARG_FROM, &args.from)?;
    let to = parse_coordinate(ARG_TO, &args.to)?;
    let meters = haversine_distance(from, to)?;
    write_json(writer, &DistanceOutput { from, to, meters })
}

/// CLI arguments for the `rank` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank candidates read from a JSON array by distance from a \
                 reference location. Candidates without a usable coordinate \
                 are kept and placed last. Without a reference the input \
                 order is preserved.",
    about = "Rank candidates nearest first"
)]
#[ortho_config(prefix = "VICINITY")]
pub(crate) struct RankArgs {
    /// Path to a JSON array of candidates.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) candidates: Option<Utf8PathBuf>,
    /// Reference location as `lat,lon`.
    #[arg(long = ARG_REFERENCE, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) reference: Option<String>,
    /// Drop ranked candidates farther than this many metres.
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
}

impl RankArgs {
    pub(crate) fn into_config(self) -> Result<RankConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RankConfig::try_from(merged)
    }
}

/// Resolved `rank` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RankConfig {
    pub(crate) candidates: Utf8PathBuf,
    pub(crate) reference: Option<Coordinate>,
    pub(crate) radius_m: Option<f64>,
}

impl TryFrom<RankArgs> for RankConfig {
    type Error = CliError;

    fn try_from(args: RankArgs) -> Result<Self, Self::Error> {
        let candidates = args.candidates.ok_or(CliError::MissingArgument {
            field: ARG_CANDIDATES,
            env: ENV_RANK_CANDIDATES,
        })?;
        let reference = parse_optional_coordinate(ARG_REFERENCE, args.reference.as_deref())?;
        let radius_m = args
            .radius
            .map(|radius| require_radius(ARG_RADIUS, radius))
            .transpose()?;
        Ok(Self {
            candidates,
            reference,
            radius_m,
        })
    }
}

pub(crate) fn run_rank_with(args: RankArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let ranked = execute_rank(&config)?;
    write_json(writer, &ranked)
}

pub(crate) fn execute_rank(config: &RankConfig) -> Result<Vec<Candidate>, CliError> {
    fs::require_existing(&config.candidates, ARG_CANDIDATES)?;
    let candidates = load_candidates(&config.candidates)?;
    debug!(
        "ranking {} candidates from {}",
        candidates.len(),
        config.candidates
    );
    Ok(match config.radius_m {
        Some(radius_m) => rank_within(config.reference, &candidates, radius_m),
        None => rank(config.reference, &candidates),
    })
}

/// Loads a JSON array of [`Candidate`] values from disk.
pub(crate) fn load_candidates(path: &Utf8Path) -> Result<Vec<Candidate>, CliError> {
    let file = fs::open_utf8_file(path).map_err(|source| CliError::OpenCandidates {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseCandidates {
        path: path.to_path_buf(),
        source,
    })
}
