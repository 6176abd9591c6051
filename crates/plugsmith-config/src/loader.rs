//! Locating and loading declaration files.

use std::path::{Path, PathBuf};

use plugsmith_core::{PluginRegistry, PluginSet, SigningCredentials};
use tracing::{debug, warn};

use crate::declaration::{
    Declaration, PluginRegistryCatalogDeclaration, PluginRegistryDeclaration,
    PluginSetCatalogDeclaration, PluginSetDeclaration, PluginSigningCredentialsDeclaration,
};
use crate::defaults::{
    PLUGIN_REGISTRY_CATALOG_FILE, PLUGIN_SET_CATALOG_FILE, PLUGIN_SIGNING_CREDENTIALS_FILE,
    config_search_dirs,
};
use crate::error::{ConfigError, ValidationErrors};
use crate::paths::expand_home;

const CONFIG_TARGET: &str = "plugsmith_config::loader";

/// Top-level configuration files found through the search path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFile {
    /// The plugin set catalog.
    PluginSetCatalog,
    /// The plugin registry catalog.
    PluginRegistryCatalog,
    /// The signing credentials declaration.
    PluginSigningCredentials,
}

impl ConfigFile {
    /// Default file name searched for.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::PluginSetCatalog => PLUGIN_SET_CATALOG_FILE,
            Self::PluginRegistryCatalog => PLUGIN_REGISTRY_CATALOG_FILE,
            Self::PluginSigningCredentials => PLUGIN_SIGNING_CREDENTIALS_FILE,
        }
    }

    /// Selects the file to load.
    ///
    /// An explicit path must name an existing file. Otherwise the standard
    /// search directories are tried in order and the first existing file
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] listing every candidate when none
    /// exists.
    pub fn locate(self, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        explicit.map_or_else(
            || self.locate_in(&config_search_dirs()),
            |path| select(vec![expand_home(path)]),
        )
    }

    /// Searches `dirs` in order for this file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] listing every candidate when none
    /// exists.
    pub fn locate_in(self, dirs: &[PathBuf]) -> Result<PathBuf, ConfigError> {
        select(dirs.iter().map(|dir| dir.join(self.file_name())).collect())
    }
}

fn select(candidates: Vec<PathBuf>) -> Result<PathBuf, ConfigError> {
    let found = candidates.iter().find(|candidate| candidate.is_file()).cloned();
    found.map_or_else(
        || Err(ConfigError::NotFound { candidates }),
        |path| {
            debug!(target: CONFIG_TARGET, path = %path.display(), "selected configuration file");
            Ok(path)
        },
    )
}

/// Loads every plugin set listed by the catalog at `path`, in catalog order.
///
/// # Errors
///
/// Returns the first [`ConfigError`] met in the catalog or any listed file.
pub fn load_plugin_set_catalog(path: &Path) -> Result<Vec<PluginSet>, ConfigError> {
    let files = read_single::<PluginSetCatalogDeclaration>(path)?;
    let mut sets = Vec::new();
    for file in files {
        sets.extend(load_plugin_set_file(&file)?);
    }
    Ok(sets)
}

/// Loads every plugin set declared in the file at `path`.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the file cannot be read, parsed, or
/// validated.
pub fn load_plugin_set_file(path: &Path) -> Result<Vec<PluginSet>, ConfigError> {
    read_multiple::<PluginSetDeclaration>(path)
}

/// Loads every plugin registry listed by the catalog at `path`, in catalog
/// order.
///
/// # Errors
///
/// Returns the first [`ConfigError`] met in the catalog or any listed file.
pub fn load_plugin_registry_catalog(path: &Path) -> Result<Vec<PluginRegistry>, ConfigError> {
    let files = read_single::<PluginRegistryCatalogDeclaration>(path)?;
    let mut registries = Vec::new();
    for file in files {
        registries.extend(load_plugin_registry_file(&file)?);
    }
    Ok(registries)
}

/// Loads every plugin registry declared in the file at `path`.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the file cannot be read, parsed, or
/// validated.
pub fn load_plugin_registry_file(path: &Path) -> Result<Vec<PluginRegistry>, ConfigError> {
    read_multiple::<PluginRegistryDeclaration>(path)
}

/// Loads the signing credentials declared at `path`.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the file cannot be read, parsed, or
/// validated.
pub fn load_signing_credentials(path: &Path) -> Result<SigningCredentials, ConfigError> {
    read_single::<PluginSigningCredentialsDeclaration>(path)
}

/// Reads `path` and returns it with the directory its relative paths are
/// resolved against.
fn read_source(path: &Path) -> Result<(String, PathBuf), ConfigError> {
    let absolute = std::path::absolute(path).map_err(|source| ConfigError::io(path, source))?;
    let text = std::fs::read_to_string(&absolute).map_err(|source| ConfigError::io(path, source))?;
    let base = absolute
        .parent()
        .map_or_else(PathBuf::new, Path::to_path_buf);
    debug!(target: CONFIG_TARGET, path = %absolute.display(), "reading configuration");
    Ok((text, base))
}

fn read_single<D: Declaration>(path: &Path) -> Result<D::Output, ConfigError> {
    let (text, base) = read_source(path)?;
    let declaration: D =
        serde_saphyr::from_str(&text).map_err(|source| ConfigError::parse(path, source))?;
    declaration
        .resolve(&base)
        .map_err(|errors| ConfigError::Invalid {
            path: path.to_path_buf(),
            errors,
        })
}

fn read_multiple<D: Declaration>(path: &Path) -> Result<Vec<D::Output>, ConfigError> {
    let (text, base) = read_source(path)?;
    let declarations: Vec<D> =
        serde_saphyr::from_multiple(&text).map_err(|source| ConfigError::parse(path, source))?;
    if declarations.is_empty() {
        warn!(
            target: CONFIG_TARGET,
            path = %path.display(),
            kind = D::KIND,
            "configuration file declares nothing"
        );
    }

    let mut errors = ValidationErrors::default();
    let mut resolved = Vec::with_capacity(declarations.len());
    for (index, declaration) in declarations.into_iter().enumerate() {
        match declaration.resolve(&base) {
            Ok(output) => resolved.push(output),
            Err(found) => errors.extend_scoped(&format!("documents[{index}]"), found),
        }
    }
    if errors.is_empty() {
        Ok(resolved)
    } else {
        Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            errors,
        })
    }
}
