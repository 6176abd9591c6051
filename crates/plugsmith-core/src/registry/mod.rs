//! Plugin registries and their deployment layers.
//!
//! A [`PluginRegistry`] declares which plugin identifiers it accepts and owns
//! an ordered list of [`PluginRegistryLayer`]s, each a target directory. The
//! registry's [`RegistryLayout`] decides how a layer deploys an archive:
//! a plain copy, or a copy wrapped in a revision-control checkout and
//! check-in.

mod layer;


use std::collections::BTreeSet;
use std::path::PathBuf;

use strum::{Display, EnumString, VariantNames};

use crate::descriptor::PluginId;

pub use self::layer::PluginRegistryLayer;

/// Deployment layout shared by every layer of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum RegistryLayout {
    /// Archives are copied into the layer directory.
    Directory,
    /// Archives are copied under RCS version control.
    Rcs,
}

/// Rule deriving a deployed file name from a plugin identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum FileNamingConvention {
    /// The full identifier: `org.example.MyPlugin.jar`.
    #[default]
    Identifier,
    /// The last identifier component: `MyPlugin.jar`.
    Abbreviated,
    /// The identifier with dots replaced by underscores:
    /// `org_example_MyPlugin.jar`.
    Underscore,
}

impl FileNamingConvention {
    /// Returns the deployed file name for `plugin_id`.
    ///
    /// ```
    /// use plugsmith_core::{FileNamingConvention, PluginId};
    ///
    /// let id = PluginId::new("org.example.MyPlugin");
    /// assert_eq!(FileNamingConvention::Abbreviated.file_name(&id), "MyPlugin.jar");
    /// assert_eq!(
    ///     FileNamingConvention::Underscore.file_name(&id),
    ///     "org_example_MyPlugin.jar"
    /// );
    /// ```
    #[must_use]
    pub fn file_name(self, plugin_id: &PluginId) -> String {
        match self {
            Self::Identifier => format!("{plugin_id}.jar"),
            Self::Abbreviated => format!("{}.jar", plugin_id.last_component()),
            Self::Underscore => format!("{}.jar", plugin_id.as_str().replace('.', "_")),
        }
    }
}

/// A named set of deployment layers accepting a fixed set of plugins.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    id: String,
    name: String,
    layout: RegistryLayout,
    plugin_ids: BTreeSet<PluginId>,
    layers: Vec<PluginRegistryLayer>,
}

impl PluginRegistry {
    /// Creates a registry without layers.
    #[must_use]
    pub fn new<I>(
        id: impl Into<String>,
        name: impl Into<String>,
        layout: RegistryLayout,
        plugin_ids: I,
    ) -> Self
    where
        I: IntoIterator<Item = PluginId>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            layout,
            plugin_ids: plugin_ids.into_iter().collect(),
            layers: Vec::new(),
        }
    }

    /// Appends a layer deploying into `path`.
    #[must_use]
    pub fn with_layer(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        naming: FileNamingConvention,
    ) -> Self {
        let layer = PluginRegistryLayer::new(
            self.id.clone(),
            self.layout,
            id.into(),
            name.into(),
            path.into(),
            naming,
        );
        self.layers.push(layer);
        self
    }

    /// Returns the registry identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the deployment layout.
    #[must_use]
    pub const fn layout(&self) -> RegistryLayout {
        self.layout
    }

    /// Returns `true` if the registry accepts the plugin.
    #[must_use]
    pub fn has_plugin(&self, plugin_id: &PluginId) -> bool {
        self.plugin_ids.contains(plugin_id)
    }

    /// Returns the accepted identifiers in sorted order.
    pub fn plugin_ids(&self) -> impl Iterator<Item = &PluginId> {
        self.plugin_ids.iter()
    }

    /// Looks a layer up by identifier.
    #[must_use]
    pub fn layer(&self, layer_id: &str) -> Option<&PluginRegistryLayer> {
        self.layers.iter().find(|layer| layer.id() == layer_id)
    }

    /// Returns the layers in declaration order.
    #[must_use]
    pub fn layers(&self) -> &[PluginRegistryLayer] {
        &self.layers
    }

    /// Returns the layer identifiers in declaration order.
    pub fn layer_ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(PluginRegistryLayer::id)
    }
}
