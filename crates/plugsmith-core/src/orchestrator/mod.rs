//! Build, deploy, and release across loaded plugin sets and registries.
//!
//! The [`Orchestrator`] owns the loaded [`PluginSet`]s and
//! [`PluginRegistry`]s in load order, plus the tool runner and the
//! confirmation capability used while deploying. Every batch is processed
//! sequentially in caller order and the first fatal error aborts the rest of
//! the batch.
//!
//! - **Build**: the first plugin set containing an identifier builds it.
//! - **Deploy**: each archive goes to every requested layer of every
//!   registry declaring its identifier. Layers a registry does not define are
//!   skipped for that registry.
//! - **Release**: build, then deploy the built archives, keyed by identifier.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::confirm::Confirm;
use crate::credentials::Signing;
use crate::descriptor::{PluginDescriptor, PluginId};
use crate::error::PluginError;
use crate::plugin_set::PluginSet;
use crate::process::ToolRunner;
use crate::registry::PluginRegistry;

const ORCHESTRATOR_TARGET: &str = "plugsmith_core::orchestrator";

/// Outcome of building one plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    /// Identifier that was requested.
    pub plugin_id: PluginId,
    /// Plugin set that built it.
    pub set_id: String,
    /// Signed archive.
    pub artifact: PathBuf,
    /// Descriptor of the built plugin.
    pub descriptor: PluginDescriptor,
}

/// Outcome of deploying one archive into one registry layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployResult {
    /// Registry deployed into.
    pub registry_id: String,
    /// Layer deployed into.
    pub layer_id: String,
    /// Deployed file, or `None` when the operator declined.
    pub path: Option<PathBuf>,
    /// Descriptor read from the archive.
    pub descriptor: PluginDescriptor,
}

/// Deployments of one requested archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    /// Archive that was requested.
    pub artifact: PathBuf,
    /// Identifier read from the archive.
    pub plugin_id: PluginId,
    /// Per registry, per layer outcomes in visiting order.
    pub deployments: Vec<DeployResult>,
}

/// Deployments of one released plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseResult {
    /// Identifier that was requested.
    pub plugin_id: PluginId,
    /// Per registry, per layer outcomes in visiting order.
    pub deployments: Vec<DeployResult>,
}

/// Routes build and deploy requests to the loaded plugin sets and registries.
#[derive(Debug)]
pub struct Orchestrator<R, C> {
    plugin_sets: Vec<PluginSet>,
    registries: Vec<PluginRegistry>,
    runner: R,
    confirm: C,
}

impl<R, C> Orchestrator<R, C> {
    /// Creates an orchestrator over sets and registries given in load order.
    #[must_use]
    pub const fn new(
        plugin_sets: Vec<PluginSet>,
        registries: Vec<PluginRegistry>,
        runner: R,
        confirm: C,
    ) -> Self {
        Self {
            plugin_sets,
            registries,
            runner,
            confirm,
        }
    }

    /// Returns the plugin sets in load order.
    #[must_use]
    pub fn plugin_sets(&self) -> &[PluginSet] {
        &self.plugin_sets
    }

    /// Returns the registries in load order.
    #[must_use]
    pub fn registries(&self) -> &[PluginRegistry] {
        &self.registries
    }

    /// Returns the tool runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: ToolRunner, C: Confirm> Orchestrator<R, C> {
    /// Builds each plugin with the first plugin set that contains it.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotFound`] for an identifier no set contains,
    /// or the first build failure.
    pub fn build(
        &mut self,
        plugin_ids: &[PluginId],
        signing: &Signing<'_>,
    ) -> Result<Vec<BuildResult>, PluginError> {
        let mut results = Vec::with_capacity(plugin_ids.len());
        for plugin_id in plugin_ids {
            let set = self
                .plugin_sets
                .iter_mut()
                .find(|set| set.has_plugin(plugin_id))
                .ok_or_else(|| PluginError::NotFound {
                    plugin_id: plugin_id.clone(),
                })?;
            debug!(
                target: ORCHESTRATOR_TARGET,
                plugin = %plugin_id,
                set = %set.id(),
                "selected plugin set"
            );
            let (artifact, descriptor) = set
                .build_plugin(plugin_id, signing, &self.runner)?
                .into_parts();
            results.push(BuildResult {
                plugin_id: plugin_id.clone(),
                set_id: set.id().to_owned(),
                artifact,
                descriptor,
            });
        }
        Ok(results)
    }

    /// Deploys each archive into the requested layers of every registry
    /// declaring its plugin.
    ///
    /// All archives are read before any is deployed.
    ///
    /// # Errors
    ///
    /// Returns a descriptor error for an unreadable archive,
    /// [`PluginError::Undeclared`] when no registry declares an archive's
    /// plugin, or the first deployment failure.
    pub fn deploy<S: AsRef<str>>(
        &self,
        artifacts: &[PathBuf],
        layer_ids: &[S],
        interactive: bool,
    ) -> Result<Vec<DeployReport>, PluginError> {
        let descriptors = artifacts
            .iter()
            .map(|artifact| PluginDescriptor::from_archive(artifact))
            .collect::<Result<Vec<_>, _>>()?;
        artifacts
            .iter()
            .zip(descriptors)
            .map(|(artifact, descriptor)| {
                let deployments = self.deploy_one(artifact, &descriptor, layer_ids, interactive)?;
                Ok(DeployReport {
                    artifact: artifact.clone(),
                    plugin_id: descriptor.identifier().clone(),
                    deployments,
                })
            })
            .collect()
    }

    /// Builds the plugins, then deploys the built archives.
    ///
    /// # Errors
    ///
    /// Returns the first error from either phase.
    pub fn release<S: AsRef<str>>(
        &mut self,
        plugin_ids: &[PluginId],
        layer_ids: &[S],
        interactive: bool,
        signing: &Signing<'_>,
    ) -> Result<Vec<ReleaseResult>, PluginError> {
        let built = self.build(plugin_ids, signing)?;
        let artifacts: Vec<PathBuf> = built.iter().map(|result| result.artifact.clone()).collect();
        let reports = self.deploy(&artifacts, layer_ids, interactive)?;
        Ok(built
            .into_iter()
            .zip(reports)
            .map(|(result, report)| ReleaseResult {
                plugin_id: result.plugin_id,
                deployments: report.deployments,
            })
            .collect())
    }

    fn deploy_one<S: AsRef<str>>(
        &self,
        artifact: &Path,
        descriptor: &PluginDescriptor,
        layer_ids: &[S],
        interactive: bool,
    ) -> Result<Vec<DeployResult>, PluginError> {
        let plugin_id = descriptor.identifier();
        let mut declared = false;
        let mut deployments = Vec::new();
        for registry in self.registries.iter().filter(|registry| registry.has_plugin(plugin_id)) {
            declared = true;
            for layer in layer_ids
                .iter()
                .filter_map(|layer_id| registry.layer(layer_id.as_ref()))
            {
                let path = layer.deploy_plugin(
                    artifact,
                    descriptor,
                    interactive,
                    &self.runner,
                    &self.confirm,
                )?;
                deployments.push(DeployResult {
                    registry_id: registry.id().to_owned(),
                    layer_id: layer.id().to_owned(),
                    path,
                    descriptor: descriptor.clone(),
                });
            }
        }
        if !declared {
            return Err(PluginError::Undeclared {
                artifact: artifact.to_path_buf(),
                plugin_id: plugin_id.clone(),
            });
        }
        info!(
            target: ORCHESTRATOR_TARGET,
            plugin = %plugin_id,
            deployments = deployments.len(),
            "deployed archive"
        );
        Ok(deployments)
    }
}
