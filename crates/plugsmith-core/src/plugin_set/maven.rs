//! Maven-style builder: one signing build for the whole project, after which
//! each plugin archive is picked up from a fixed output directory.

use std::path::PathBuf;

use tracing::info;

use super::{BuiltArtifact, PLUGIN_SET_TARGET, PluginSet, ensure_artifact};
use crate::credentials::Signing;
use crate::descriptor::{PluginDescriptor, PluginId};
use crate::error::PluginError;
use crate::process::{ToolInvocation, ToolRunner};

const OUTPUT_DIR: &str = "target/pluginjars";

pub(super) fn build(
    set: &mut PluginSet,
    plugin_id: &PluginId,
    signing: &Signing<'_>,
    runner: &dyn ToolRunner,
) -> Result<BuiltArtifact, PluginError> {
    if !set.is_built() {
        let mut package = ToolInvocation::new("mvn", set.root_path())
            .arg("package")
            .arg(format!("-Dkeystore.file={}", signing.keystore().display()))
            .arg(format!("-Dkeystore.alias={}", signing.alias()));
        if let Some(password) = signing.password()? {
            package = package.secret_arg("-Dkeystore.password=", &password);
        }
        runner.run(&package)?;
        set.mark_built();
    }

    let jar = jar_path(set, plugin_id);
    ensure_artifact(plugin_id, &jar)?;
    let descriptor = PluginDescriptor::from_archive(&jar)?;
    info!(
        target: PLUGIN_SET_TARGET,
        set = %set.id(),
        plugin = %plugin_id,
        jar = %jar.display(),
        "collected built plugin"
    );
    Ok(BuiltArtifact::new(jar, descriptor))
}

fn jar_path(set: &PluginSet, plugin_id: &PluginId) -> PathBuf {
    set.root_path().join(OUTPUT_DIR).join(format!("{plugin_id}.jar"))
}
