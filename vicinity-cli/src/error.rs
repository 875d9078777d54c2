//! Error types emitted by the Vicinity CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use vicinity_core::{CoordinateError, DistanceError, SessionError};
use vicinity_data::locationiq::ClientBuildError;

/// Errors emitted by the Vicinity CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A coordinate argument was not `lat,lon`.
    #[error("{field} {value:?} is not a coordinate; expected `lat,lon`")]
    MalformedCoordinate { field: &'static str, value: String },
    /// A coordinate argument was out of range.
    #[error("{field} {value:?} is not a valid coordinate: {source}")]
    InvalidCoordinate {
        field: &'static str,
        value: String,
        #[source]
        source: CoordinateError,
    },
    /// A distance could not be computed.
    #[error(transparent)]
    Distance(#[from] DistanceError),
    /// A numeric option was negative or not finite.
    #[error("{field} must be a non-negative number, got {value}")]
    InvalidRadius { field: &'static str, value: f64 },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the candidates file failed.
    #[error("failed to open candidates at {path:?}: {source}")]
    OpenCandidates {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Candidates JSON could not be decoded.
    #[error("failed to parse candidates JSON at {path:?}: {source}")]
    ParseCandidates {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Constructing the LocationIQ client failed.
    #[error("failed to build LocationIQ client: {0}")]
    BuildClient(#[from] ClientBuildError),
    /// The session discarded a result.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
