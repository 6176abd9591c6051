//! Declarative configuration for plugsmith.
//!
//! Plugin sets, plugin registries, and signing credentials are declared in
//! YAML documents carrying a `kind` discriminant. This crate locates those
//! files, parses them with `serde-saphyr`, validates every document, and
//! converts the declarations into the `plugsmith-core` domain types.
//!
//! Catalog files list the declaration files to load:
//!
//! ```yaml
//! kind: PluginSetCatalog
//! plugin-set-files:
//!   - sets/main.yaml
//! ```
//!
//! Relative paths are resolved against the directory of the file that
//! declares them, after `~` expansion.

mod declaration;
mod defaults;
mod error;
mod loader;
mod logging;
mod paths;

pub use declaration::{
    BuilderDeclaration, LayerDeclaration, LayoutDeclaration, PluginRegistryCatalogDeclaration,
    PluginRegistryDeclaration, PluginSetCatalogDeclaration, PluginSetDeclaration,
    PluginSigningCredentialsDeclaration,
};
pub use defaults::{
    APP_DIR, DEFAULT_LOG_FILTER, PLUGIN_REGISTRY_CATALOG_FILE, PLUGIN_SET_CATALOG_FILE,
    PLUGIN_SIGNING_CREDENTIALS_FILE, config_search_dirs, default_log_format,
};
pub use error::{ConfigError, ValidationErrors, ValidationIssue};
pub use loader::{
    ConfigFile, load_plugin_registry_catalog, load_plugin_registry_file,
    load_plugin_set_catalog, load_plugin_set_file, load_signing_credentials,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use paths::{expand_home, resolve_relative};
