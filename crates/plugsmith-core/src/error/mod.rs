//! Domain errors raised while building and deploying plugins.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::descriptor::PluginId;

/// Errors raised while reading a plugin descriptor from a source tree or a
/// packaged archive.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The descriptor file or archive could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The descriptor is not well-formed XML.
    #[error("{}: malformed descriptor: {source}", path.display())]
    Xml {
        /// Descriptor origin.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: roxmltree::Error,
    },

    /// The root container element is not a `map`.
    #[error("{}: invalid root element: {found}", path.display())]
    InvalidRoot {
        /// Descriptor origin.
        path: PathBuf,
        /// Tag name that was found instead.
        found: String,
    },

    /// A required field is absent.
    #[error("{}: missing required entry '{field}'", path.display())]
    MissingField {
        /// Descriptor origin.
        path: PathBuf,
        /// Entry key that was expected.
        field: &'static str,
    },

    /// An entry key is declared more than once.
    #[error("{}: descriptor declares {count} entries for '{field}'", path.display())]
    DuplicateEntry {
        /// Descriptor origin.
        path: PathBuf,
        /// Repeated entry key.
        field: &'static str,
        /// Number of declarations found.
        count: usize,
    },

    /// An entry holds a value of the wrong shape.
    #[error("{}: invalid value for '{field}': {value:?}", path.display())]
    InvalidField {
        /// Descriptor origin.
        path: PathBuf,
        /// Entry key.
        field: &'static str,
        /// Offending raw value.
        value: String,
    },

    /// The archive could not be opened or an entry could not be extracted.
    #[error("{}: unreadable archive: {message}", path.display())]
    Archive {
        /// Archive path.
        path: PathBuf,
        /// Description of the archive failure.
        message: String,
    },

    /// No manifest section flags a plugin descriptor.
    #[error("{}: no valid plugin entry in the archive manifest", path.display())]
    NoDescriptorEntry {
        /// Archive path.
        path: PathBuf,
    },

    /// More than one manifest section flags a plugin descriptor.
    #[error("{}: archive manifest flags {count} plugin entries", path.display())]
    AmbiguousDescriptorEntry {
        /// Archive path.
        path: PathBuf,
        /// Number of flagged sections.
        count: usize,
    },
}

/// Errors raised by external tool invocations.
///
/// Command lines carried by these errors are always rendered with secret
/// arguments redacted.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The program could not be started.
    #[error("failed to run {command}: {source}")]
    Spawn {
        /// Redacted command line.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The program ran but reported failure.
    #[error("command {command} exited with status {status}")]
    NonZeroExit {
        /// Redacted command line.
        command: String,
        /// Exit status, or `-1` when the process was killed by a signal.
        status: i32,
    },
}

/// Errors raised while acquiring the signing password.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The password source was unavailable or refused to answer.
    #[error("signing password unavailable: {message}")]
    Unavailable {
        /// Human-readable description.
        message: String,
    },

    /// Reading the password failed.
    #[error("failed to read signing password: {source}")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Errors that abort a build, deploy, or release batch.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The declared configuration cannot be acted upon.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// No loaded plugin set contains the identifier.
    #[error("{plugin_id}: not found in any plugin set")]
    NotFound {
        /// Identifier that was requested.
        plugin_id: PluginId,
    },

    /// No loaded registry declares the identifier.
    #[error("{}: {plugin_id} not declared in any plugin registry", artifact.display())]
    Undeclared {
        /// Artifact that was to be deployed.
        artifact: PathBuf,
        /// Identifier read from the artifact.
        plugin_id: PluginId,
    },

    /// A parent chain loops back on itself.
    #[error("{plugin_id}: ancestor chain revisits {repeated}")]
    AncestorCycle {
        /// Identifier whose chain was being resolved.
        plugin_id: PluginId,
        /// Identifier encountered twice.
        repeated: PluginId,
    },

    /// A packaging, signing, or revision-control tool failed.
    #[error(transparent)]
    ExternalTool(#[from] ToolError),

    /// The build reported success but the expected artifact is missing.
    #[error("{plugin_id}: built archive not found: {}", path.display())]
    ArtifactNotProduced {
        /// Identifier that was built.
        plugin_id: PluginId,
        /// Path where the artifact was expected.
        path: PathBuf,
    },

    /// The archive to deploy is the destination file itself.
    #[error("{}: archive is already the deployed file", path.display())]
    SourceIsDestination {
        /// The shared path.
        path: PathBuf,
    },

    /// A descriptor could not be read.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// The signing password could not be obtained.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being operated on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The operator could not be asked for confirmation.
    #[error("failed to prompt for confirmation: {source}")]
    Prompt {
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PluginError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
