//! Ant-style builder: project preparation once, then per-plugin packaging
//! and signing scripts.

use std::path::PathBuf;

use tracing::{debug, info};

use super::{BuiltArtifact, PLUGIN_SET_TARGET, PluginSet, ensure_artifact};
use crate::credentials::Signing;
use crate::descriptor::PluginId;
use crate::error::PluginError;
use crate::process::{ToolInvocation, ToolRunner};

/// Environment variable the Ant toolchain cannot run without.
const JAVA_HOME: &str = "JAVA_HOME";

const JAR_DIR: &str = "plugins/jars";
const JARPLUGIN: &str = "test/scripts/jarplugin";
const SIGNPLUGIN: &str = "test/scripts/signplugin";

pub(super) fn build(
    set: &mut PluginSet,
    plugin_id: &PluginId,
    signing: &Signing<'_>,
    runner: &dyn ToolRunner,
) -> Result<BuiltArtifact, PluginError> {
    if runner.env_var(JAVA_HOME).is_none_or(|value| value.is_empty()) {
        return Err(PluginError::Configuration {
            message: format!("{JAVA_HOME} must be set to build plugin set {}", set.id()),
        });
    }
    prepare_project(set, runner)?;

    let descriptor = set.descriptor(plugin_id)?;
    let dirs = set.packaging_dirs(plugin_id)?;
    let jar = jar_path(set, plugin_id);
    if let Some(parent) = jar.parent() {
        std::fs::create_dir_all(parent).map_err(|source| PluginError::io(parent, source))?;
    }

    let mut package = ToolInvocation::new(JARPLUGIN, set.root_path())
        .arg("-j")
        .arg(jar.to_string_lossy())
        .arg("-p")
        .arg(plugin_id.resource_path().to_string_lossy());
    for dir in &dirs {
        package = package.arg("-d").arg(dir.to_string_lossy());
    }
    runner.run(&package)?;

    let mut sign = ToolInvocation::new(SIGNPLUGIN, set.root_path())
        .arg("--jar")
        .arg(jar.to_string_lossy())
        .arg("--alias")
        .arg(signing.alias())
        .arg("--keystore")
        .arg(signing.keystore().to_string_lossy());
    if let Some(password) = signing.password()? {
        sign = sign.secret_args("--password", &password);
    }
    debug!(
        target: PLUGIN_SET_TARGET,
        command = %sign.command_line(),
        "signing plugin archive"
    );
    runner.run(&sign)?;

    ensure_artifact(plugin_id, &jar)?;
    info!(
        target: PLUGIN_SET_TARGET,
        set = %set.id(),
        plugin = %plugin_id,
        jar = %jar.display(),
        "built plugin"
    );
    Ok(BuiltArtifact::new(jar, descriptor))
}

fn prepare_project(set: &mut PluginSet, runner: &dyn ToolRunner) -> Result<(), PluginError> {
    if set.is_built() {
        return Ok(());
    }
    let invocation = ToolInvocation::new("ant", set.root_path()).arg("load-plugins");
    runner.run(&invocation)?;
    set.mark_built();
    Ok(())
}

fn jar_path(set: &PluginSet, plugin_id: &PluginId) -> PathBuf {
    set.root_path().join(JAR_DIR).join(format!("{plugin_id}.jar"))
}
