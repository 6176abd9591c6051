//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(#[from] plugsmith_config::ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read list file {}: {source}", path.display())]
    ReadList { path: PathBuf, source: io::Error },
    #[error("list of plugin identifiers is empty")]
    NoIdentifiers,
    #[error("list of plugin archives is empty")]
    NoArchives,
    #[error("at least one layer must be requested")]
    NoLayers,
    #[error(transparent)]
    Plugin(#[from] plugsmith_core::PluginError),
    #[error("failed to serialise results: {0}")]
    SerialiseResults(serde_json::Error),
    #[error("failed to write results: {0}")]
    WriteResults(io::Error),
}
