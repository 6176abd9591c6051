//! Configuration loading failures.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while locating, reading, or validating configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No candidate file exists.
    #[error("configuration file not found: {}", join_candidates(candidates))]
    NotFound {
        /// Every path that was tried, in search order.
        candidates: Vec<PathBuf>,
    },

    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A configuration file is not valid YAML for its declaration kind.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: Arc<serde_saphyr::Error>,
    },

    /// A configuration file parsed but its contents are inconsistent.
    #[error("invalid configuration in {}: {errors}", path.display())]
    Invalid {
        /// File holding the offending declarations.
        path: PathBuf,
        /// Every problem found.
        errors: ValidationErrors,
    },
}

impl ConfigError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn parse(path: &Path, source: serde_saphyr::Error) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }
}

fn join_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|candidate| candidate.display().to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// One problem found while validating a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field, such as `layers[1].id`.
    pub field: String,
    /// Description of the problem.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every problem found in a configuration file, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    /// Records a problem with `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Appends `other`, prefixing each field with `scope`.
    pub fn extend_scoped(&mut self, scope: &str, other: Self) {
        self.issues
            .extend(other.issues.into_iter().map(|issue| ValidationIssue {
                field: format!("{scope}.{}", issue.field),
                message: issue.message,
            }));
    }

    /// Returns `true` when no problem was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns the recorded problems in discovery order.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Records an error unless `value` holds something other than
    /// whitespace.
    pub(crate) fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        }
    }

    /// Parses one of a closed set of values, recording an error listing the
    /// accepted ones on failure.
    pub(crate) fn choice<T>(&mut self, field: &str, value: &str) -> Option<T>
    where
        T: std::str::FromStr + strum::VariantNames,
    {
        let parsed = value.parse().ok();
        if parsed.is_none() {
            self.push(
                field,
                format!("unknown value '{value}'; expected one of: {}", T::VARIANTS.join(", ")),
            );
        }
        parsed
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.issues.len();
        write!(f, "{count} problem{}", if count == 1 { "" } else { "s" })?;
        for issue in &self.issues {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
