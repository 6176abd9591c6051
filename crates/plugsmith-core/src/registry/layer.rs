//! Deployment into a single registry layer.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{FileNamingConvention, RegistryLayout};
use crate::confirm::Confirm;
use crate::descriptor::{PluginDescriptor, PluginId};
use crate::error::PluginError;
use crate::process::{ToolInvocation, ToolRunner};

const LAYER_TARGET: &str = "plugsmith_core::registry::layer";

/// Shell test succeeding only when SELinux is enabled and `chcon` exists.
const RELABEL_PROBE: &str =
    "command -v selinuxenabled >/dev/null && selinuxenabled && command -v chcon >/dev/null";
const RELABEL_TYPE: &str = "httpd_sys_content_t";

const HISTORY_DIR: &str = "RCS";

/// A target directory within a registry.
#[derive(Debug, Clone)]
pub struct PluginRegistryLayer {
    registry_id: String,
    layout: RegistryLayout,
    id: String,
    name: String,
    path: PathBuf,
    naming: FileNamingConvention,
}

impl PluginRegistryLayer {
    pub(super) const fn new(
        registry_id: String,
        layout: RegistryLayout,
        id: String,
        name: String,
        path: PathBuf,
        naming: FileNamingConvention,
    ) -> Self {
        Self {
            registry_id,
            layout,
            id,
            name,
            path,
            naming,
        }
    }

    /// Returns the layer identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identifier of the owning registry.
    #[must_use]
    pub fn registry_id(&self) -> &str {
        &self.registry_id
    }

    /// Returns the target directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the naming convention for deployed files.
    #[must_use]
    pub const fn naming(&self) -> FileNamingConvention {
        self.naming
    }

    /// Returns where the plugin would be deployed in this layer.
    #[must_use]
    pub fn destination(&self, plugin_id: &PluginId) -> PathBuf {
        self.path.join(self.naming.file_name(plugin_id))
    }

    /// Returns the currently deployed file for the plugin, if there is one.
    #[must_use]
    pub fn deployed_file(&self, plugin_id: &PluginId) -> Option<PathBuf> {
        let destination = self.destination(plugin_id);
        destination.is_file().then_some(destination)
    }

    /// Lists the archives present in the layer directory, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] if the directory cannot be listed.
    pub fn deployed_jars(&self) -> Result<Vec<PathBuf>, PluginError> {
        let entries =
            std::fs::read_dir(&self.path).map_err(|source| PluginError::io(&self.path, source))?;
        let mut jars = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| PluginError::io(&self.path, source))?
                .path();
            if path.extension().is_some_and(|ext| ext == "jar") {
                jars.push(path);
            }
        }
        jars.sort();
        Ok(jars)
    }

    /// Deploys an archive into this layer and returns the deployed path.
    ///
    /// The archive is copied over the destination byte for byte, so
    /// deploying the same archive twice leaves the same file behind. When
    /// `interactive` is set and the destination does not exist yet, the
    /// operator is asked first; a refusal yields `Ok(None)`. Without
    /// `interactive`, new destinations are created unattended.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::SourceIsDestination`] if `artifact` already is
    /// the destination file, [`PluginError::Prompt`] if the question cannot
    /// be asked, [`PluginError::Io`] if the copy fails, and
    /// [`PluginError::ExternalTool`] if a relabel or revision-control step
    /// fails.
    pub fn deploy_plugin(
        &self,
        artifact: &Path,
        descriptor: &PluginDescriptor,
        interactive: bool,
        runner: &dyn ToolRunner,
        confirm: &dyn Confirm,
    ) -> Result<Option<PathBuf>, PluginError> {
        let destination = self.destination(descriptor.identifier());
        if same_file(artifact, &destination) {
            return Err(PluginError::SourceIsDestination { path: destination });
        }
        if interactive && !destination.exists() && !self.confirm_creation(&destination, confirm)? {
            warn!(
                target: LAYER_TARGET,
                registry = %self.registry_id,
                layer = %self.id,
                destination = %destination.display(),
                "deployment declined"
            );
            return Ok(None);
        }

        match self.layout {
            RegistryLayout::Directory => self.copy(artifact, &destination, runner)?,
            RegistryLayout::Rcs => self.copy_under_rcs(artifact, &destination, descriptor, runner)?,
        }

        info!(
            target: LAYER_TARGET,
            registry = %self.registry_id,
            layer = %self.id,
            plugin = %descriptor.identifier(),
            destination = %destination.display(),
            "deployed plugin"
        );
        Ok(Some(destination))
    }

    fn confirm_creation(
        &self,
        destination: &Path,
        confirm: &dyn Confirm,
    ) -> Result<bool, PluginError> {
        let question = format!(
            "{} does not exist in {}:{} ({}); create it (y/n)? [n] ",
            destination.display(),
            self.registry_id,
            self.id,
            self.name
        );
        confirm.confirm(&question).map_err(|source| PluginError::Prompt {
            source: source.into(),
        })
    }

    /// Copies the archive and relabels it when the host enforces SELinux.
    fn copy(
        &self,
        artifact: &Path,
        destination: &Path,
        runner: &dyn ToolRunner,
    ) -> Result<(), PluginError> {
        std::fs::copy(artifact, destination)
            .map_err(|source| PluginError::io(destination, source))?;
        let probe = ToolInvocation::new("sh", &self.path).args(["-c", RELABEL_PROBE]);
        if runner.probe(&probe) {
            let relabel = ToolInvocation::new("chcon", &self.path)
                .args(["-t", RELABEL_TYPE])
                .arg(file_name(destination));
            runner.run(&relabel)?;
        } else {
            debug!(target: LAYER_TARGET, "SELinux relabel unavailable, skipping");
        }
        Ok(())
    }

    fn copy_under_rcs(
        &self,
        artifact: &Path,
        destination: &Path,
        descriptor: &PluginDescriptor,
        runner: &dyn ToolRunner,
    ) -> Result<(), PluginError> {
        let basename = file_name(destination);
        let history = self
            .path
            .join(HISTORY_DIR)
            .join(format!("{basename},v"));
        let has_history = history.is_file();

        if destination.exists() && has_history {
            let checkout = ToolInvocation::new("co", &self.path).args(["-l", basename.as_str()]);
            runner.run(&checkout)?;
        }
        self.copy(artifact, destination, runner)?;

        let mut checkin = ToolInvocation::new("ci", &self.path)
            .arg("-u")
            .arg(format!("-mVersion {}", descriptor.version()));
        if !has_history {
            let description = descriptor
                .name()
                .unwrap_or_else(|| descriptor.identifier().as_str());
            checkin = checkin.arg(format!("-t-{description}"));
        }
        runner.run(&checkin.arg(basename))?;
        Ok(())
    }
}

fn same_file(source: &Path, destination: &Path) -> bool {
    std::fs::canonicalize(source)
        .ok()
        .zip(std::fs::canonicalize(destination).ok())
        .is_some_and(|(source_path, destination_path)| source_path == destination_path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
