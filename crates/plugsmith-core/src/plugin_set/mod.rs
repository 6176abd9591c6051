//! Plugin sets: source trees able to package and sign plugins.
//!
//! A [`PluginSet`] owns a project root and a main source directory holding
//! plugin descriptors. Building is delegated to one of a closed set of
//! builder backends selected by [`BuilderKind`]:
//!
//! - **Ant** prepares the whole project once, then packages each plugin with
//!   an explicit list of source directories and signs the result in a
//!   separate step.
//! - **Maven** runs one whole-project build that also signs every plugin, then
//!   picks up the already-signed archive.
//!
//! Both backends share a one-shot latch recording that the whole-project step
//! has run for this set instance.

mod ant;
mod maven;


use std::path::{Path, PathBuf};

use strum::{Display, EnumString, VariantNames};
use tracing::debug;

use crate::credentials::Signing;
use crate::descriptor::{PluginDescriptor, PluginId, package_dir_of};
use crate::error::{DescriptorError, PluginError};
use crate::process::ToolRunner;

const PLUGIN_SET_TARGET: &str = "plugsmith_core::plugin_set";

/// Builder backend of a plugin set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum BuilderKind {
    /// Separate packaging and signing scripts driven by an Ant project.
    Ant,
    /// A Maven project whose package phase signs plugin archives.
    Maven,
}

impl BuilderKind {
    /// Default main source directory, relative to the project root.
    #[must_use]
    pub const fn default_main(self) -> &'static str {
        match self {
            Self::Ant => "plugins/src",
            Self::Maven => "src/main/java",
        }
    }

    /// Default test source directory, relative to the project root.
    #[must_use]
    pub const fn default_test(self) -> &'static str {
        match self {
            Self::Ant => "plugins/test/src",
            Self::Maven => "src/test/java",
        }
    }
}

/// A built, signed plugin archive and the descriptor it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    path: PathBuf,
    descriptor: PluginDescriptor,
}

impl BuiltArtifact {
    pub(crate) const fn new(path: PathBuf, descriptor: PluginDescriptor) -> Self {
        Self { path, descriptor }
    }

    /// Returns the archive path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the plugin descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// Splits into path and descriptor.
    #[must_use]
    pub fn into_parts(self) -> (PathBuf, PluginDescriptor) {
        (self.path, self.descriptor)
    }
}

/// A source tree plus builder configuration.
///
/// # Example
///
/// ```
/// use plugsmith_core::{BuilderKind, PluginSet};
/// use std::path::Path;
///
/// let set = PluginSet::new("core", "Core plugins", BuilderKind::Maven, "/srv/plugins")
///     .with_main("java");
/// assert_eq!(set.main_path(), Path::new("/srv/plugins/java"));
/// assert_eq!(set.test_path(), Path::new("/srv/plugins/src/test/java"));
/// ```
#[derive(Debug, Clone)]
pub struct PluginSet {
    id: String,
    name: String,
    kind: BuilderKind,
    root: PathBuf,
    main: PathBuf,
    test: PathBuf,
    built: bool,
}

impl PluginSet {
    /// Creates a plugin set rooted at `root` with the builder's default
    /// main and test directories.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: BuilderKind,
        root: impl Into<PathBuf>,
    ) -> Self {
        let root = root.into();
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            main: root.join(kind.default_main()),
            test: root.join(kind.default_test()),
            root,
            built: false,
        }
    }

    /// Overrides the main source directory; relative paths are resolved
    /// against the root.
    #[must_use]
    pub fn with_main(mut self, main: impl AsRef<Path>) -> Self {
        self.main = self.root.join(main);
        self
    }

    /// Overrides the test source directory; relative paths are resolved
    /// against the root.
    #[must_use]
    pub fn with_test(mut self, test: impl AsRef<Path>) -> Self {
        self.test = self.root.join(test);
        self
    }

    /// Returns the set identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the builder backend.
    #[must_use]
    pub const fn kind(&self) -> BuilderKind {
        self.kind
    }

    /// Returns the project root.
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Returns the main source directory.
    #[must_use]
    pub fn main_path(&self) -> &Path {
        &self.main
    }

    /// Returns the test source directory.
    #[must_use]
    pub fn test_path(&self) -> &Path {
        &self.test
    }

    /// Returns `true` once the whole-project step has run.
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.built
    }

    /// Returns `true` if the set's sources contain the plugin's descriptor.
    #[must_use]
    pub fn has_plugin(&self, plugin_id: &PluginId) -> bool {
        self.descriptor_path(plugin_id).is_file()
    }

    /// Parses the plugin's descriptor from the set's sources.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] if the descriptor is missing or invalid.
    pub fn descriptor(&self, plugin_id: &PluginId) -> Result<PluginDescriptor, DescriptorError> {
        PluginDescriptor::from_path(&self.descriptor_path(plugin_id))
    }

    /// Resolves the source directories needed to package a plugin.
    ///
    /// Walks from the plugin up its parent chain. Each plugin contributes the
    /// directory holding its descriptor, followed by the directory of every
    /// auxiliary package it declares. Directories are relative to the main
    /// source directory, deduplicated, and kept in first-discovery order.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Descriptor`] if any descriptor in the chain
    /// cannot be read and [`PluginError::AncestorCycle`] if the chain loops.
    pub fn packaging_dirs(&self, plugin_id: &PluginId) -> Result<Vec<PathBuf>, PluginError> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        let mut visited: Vec<PluginId> = Vec::new();
        let mut current = Some(plugin_id.clone());
        while let Some(id) = current.take() {
            if visited.contains(&id) {
                return Err(PluginError::AncestorCycle {
                    plugin_id: plugin_id.clone(),
                    repeated: id,
                });
            }
            let descriptor = self.descriptor(&id)?;
            push_unique(&mut dirs, id.package_dir());
            for package in descriptor.aux_packages() {
                push_unique(&mut dirs, package_dir_of(package));
            }
            current = descriptor.parent_identifier().cloned();
            visited.push(id);
        }
        debug!(
            target: PLUGIN_SET_TARGET,
            set = %self.id,
            plugin = %plugin_id,
            dirs = ?dirs,
            "resolved packaging directories"
        );
        Ok(dirs)
    }

    /// Builds and signs a plugin, returning the archive and its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ExternalTool`] when a build or signing tool
    /// fails (with credentials redacted from the reported command line),
    /// [`PluginError::ArtifactNotProduced`] when the archive is missing after
    /// a successful build, and descriptor or credential errors as they arise.
    pub fn build_plugin(
        &mut self,
        plugin_id: &PluginId,
        signing: &Signing<'_>,
        runner: &dyn ToolRunner,
    ) -> Result<BuiltArtifact, PluginError> {
        match self.kind {
            BuilderKind::Ant => ant::build(self, plugin_id, signing, runner),
            BuilderKind::Maven => maven::build(self, plugin_id, signing, runner),
        }
    }

    fn descriptor_path(&self, plugin_id: &PluginId) -> PathBuf {
        self.main.join(plugin_id.resource_path())
    }

    /// Records that the whole-project step ran.
    const fn mark_built(&mut self) {
        self.built = true;
    }
}

fn push_unique(dirs: &mut Vec<PathBuf>, dir: PathBuf) {
    if !dirs.contains(&dir) {
        dirs.push(dir);
    }
}

/// Fails with [`PluginError::ArtifactNotProduced`] unless `path` is a file.
fn ensure_artifact(plugin_id: &PluginId, path: &Path) -> Result<(), PluginError> {
    if path.is_file() {
        return Ok(());
    }
    Err(PluginError::ArtifactNotProduced {
        plugin_id: plugin_id.clone(),
        path: path.to_path_buf(),
    })
}
