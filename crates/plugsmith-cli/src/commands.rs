//! Command handlers: load the declarations each command needs, run the
//! orchestrator, and render the results.

use std::io::{BufRead, Write};

use plugsmith_config::{
    ConfigFile, load_plugin_registry_catalog, load_plugin_set_catalog, load_signing_credentials,
};
use plugsmith_core::{
    CachedPassword, Decline, Orchestrator, PluginId, PluginRegistry, PluginSet, Signing,
    SigningCredentials, SystemToolRunner,
};
use tracing::info;

use crate::cli::{
    BuildArgs, DeployArgs, GlobalArgs, IdentifierArgs, LayerArgs, ReleaseArgs,
    ResolvedOutputFormat,
};
use crate::errors::AppError;
use crate::inputs;
use crate::password::SigningPassword;
use crate::prompt::TerminalConfirm;
use crate::render;

const COMMAND_TARGET: &str = "plugsmith_cli::commands";

/// Streams and settings shared by every command.
pub(crate) struct CommandContext<'a, W: Write, R: BufRead> {
    pub(crate) global: &'a GlobalArgs,
    pub(crate) stdout: &'a mut W,
    pub(crate) stdin: &'a mut R,
    pub(crate) format: ResolvedOutputFormat,
}

pub(crate) fn build<W: Write, R: BufRead>(
    context: CommandContext<'_, W, R>,
    args: BuildArgs,
) -> Result<(), AppError> {
    let plugin_ids = identifiers(args.identifiers, context.stdin)?;
    let credentials = signing_credentials(context.global)?;
    let mut orchestrator = Orchestrator::new(
        plugin_sets(context.global)?,
        Vec::new(),
        SystemToolRunner,
        Decline,
    );
    let password = CachedPassword::new(SigningPassword::new(
        args.password.password,
        context.global.interactive(),
    ));

    info!(target: COMMAND_TARGET, count = plugin_ids.len(), "building plugins");
    let results = orchestrator.build(&plugin_ids, &Signing::new(&credentials, &password))?;
    render::emit(context.stdout, context.format, results.as_slice(), render::build_table)
}

pub(crate) fn deploy<W: Write, R: BufRead>(
    context: CommandContext<'_, W, R>,
    args: DeployArgs,
) -> Result<(), AppError> {
    let entries = inputs::collect(Vec::new(), &args.jars_file, context.stdin)?;
    let archives = inputs::into_paths(args.jars, entries);
    if archives.is_empty() {
        return Err(AppError::NoArchives);
    }
    let layer_ids = layers(&args.layers)?;
    let orchestrator = Orchestrator::new(
        Vec::new(),
        plugin_registries(context.global)?,
        SystemToolRunner,
        TerminalConfirm::new(context.stdin),
    );

    info!(target: COMMAND_TARGET, count = archives.len(), "deploying archives");
    let reports = orchestrator.deploy(&archives, &layer_ids, context.global.interactive())?;
    render::emit(context.stdout, context.format, reports.as_slice(), render::deploy_table)
}

pub(crate) fn release<W: Write, R: BufRead>(
    context: CommandContext<'_, W, R>,
    args: ReleaseArgs,
) -> Result<(), AppError> {
    let plugin_ids = identifiers(args.identifiers, context.stdin)?;
    let layer_ids = layers(&args.layers)?;
    let credentials = signing_credentials(context.global)?;
    let mut orchestrator = Orchestrator::new(
        plugin_sets(context.global)?,
        plugin_registries(context.global)?,
        SystemToolRunner,
        TerminalConfirm::new(context.stdin),
    );
    let password = CachedPassword::new(SigningPassword::new(
        args.password.password,
        context.global.interactive(),
    ));

    info!(target: COMMAND_TARGET, count = plugin_ids.len(), "releasing plugins");
    let results = orchestrator.release(
        &plugin_ids,
        &layer_ids,
        context.global.interactive(),
        &Signing::new(&credentials, &password),
    )?;
    render::emit(context.stdout, context.format, results.as_slice(), render::release_table)
}

fn identifiers<R: BufRead>(args: IdentifierArgs, stdin: &mut R) -> Result<Vec<PluginId>, AppError> {
    let entries = inputs::collect(args.identifiers, &args.identifiers_file, stdin)?;
    if entries.is_empty() {
        return Err(AppError::NoIdentifiers);
    }
    Ok(entries.into_iter().map(PluginId::new).collect())
}

fn layers(args: &LayerArgs) -> Result<Vec<String>, AppError> {
    let layer_ids = args.layer_ids();
    if layer_ids.is_empty() {
        return Err(AppError::NoLayers);
    }
    Ok(layer_ids)
}

fn plugin_sets(global: &GlobalArgs) -> Result<Vec<PluginSet>, AppError> {
    let catalog = ConfigFile::PluginSetCatalog.locate(global.plugin_set_catalog.as_deref())?;
    Ok(load_plugin_set_catalog(&catalog)?)
}

fn plugin_registries(global: &GlobalArgs) -> Result<Vec<PluginRegistry>, AppError> {
    let catalog =
        ConfigFile::PluginRegistryCatalog.locate(global.plugin_registry_catalog.as_deref())?;
    Ok(load_plugin_registry_catalog(&catalog)?)
}

fn signing_credentials(global: &GlobalArgs) -> Result<SigningCredentials, AppError> {
    let file = ConfigFile::PluginSigningCredentials
        .locate(global.plugin_signing_credentials.as_deref())?;
    Ok(load_signing_credentials(&file)?)
}
