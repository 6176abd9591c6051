use std::path::PathBuf;

use crate::logging::LogFormat;

/// Directory name used under every configuration search root.
pub const APP_DIR: &str = "plugsmith";

/// Default file name of the plugin set catalog.
pub const PLUGIN_SET_CATALOG_FILE: &str = "plugin-set-catalog.yaml";

/// Default file name of the plugin registry catalog.
pub const PLUGIN_REGISTRY_CATALOG_FILE: &str = "plugin-registry-catalog.yaml";

/// Default file name of the signing credentials declaration.
pub const PLUGIN_SIGNING_CREDENTIALS_FILE: &str = "plugin-signing-credentials.yaml";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Directories searched, in order, for configuration files.
///
/// The user configuration directory comes first when the platform has one,
/// followed by the site-wide `/usr/local/share` and `/etc` locations.
#[must_use]
pub fn config_search_dirs() -> Vec<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .into_iter()
        .chain([
            PathBuf::from("/usr/local/share").join(APP_DIR),
            PathBuf::from("/etc").join(APP_DIR),
        ])
        .collect()
}
