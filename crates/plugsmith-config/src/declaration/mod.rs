//! YAML declaration models and their conversion into core types.
//!
//! Each model mirrors one document `kind`. Field names use kebab case, and
//! unknown fields are rejected by the parser. Semantic checks happen in
//! [`Declaration::resolve`], which reports every problem in a document at
//! once instead of stopping at the first.

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use plugsmith_core::{
    BuilderKind, FileNamingConvention, PluginId, PluginRegistry, PluginSet, RegistryLayout,
    SigningCredentials,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ValidationErrors;
use crate::paths::{expand_home, resolve_relative};

/// A document kind that converts into a core value.
pub(crate) trait Declaration: DeserializeOwned {
    /// Value of the `kind` discriminant.
    const KIND: &'static str;

    /// Value produced once the document validates.
    type Output;

    /// Validates the document and converts it, resolving relative paths
    /// against `base`.
    fn resolve(self, base: &Path) -> Result<Self::Output, ValidationErrors>;
}

fn check_kind(errors: &mut ValidationErrors, found: &str, expected: &str) {
    if found != expected {
        errors.push("kind", format!("expected '{expected}', found '{found}'"));
    }
}

fn require_path(errors: &mut ValidationErrors, field: &str, path: &Path) {
    if path.as_os_str().is_empty() {
        errors.push(field, "must not be empty");
    }
}

fn resolve_file_list(
    errors: &mut ValidationErrors,
    field: &str,
    files: Vec<PathBuf>,
    base: &Path,
) -> Vec<PathBuf> {
    if files.is_empty() {
        errors.push(field, "must list at least one file");
    }
    files
        .into_iter()
        .enumerate()
        .map(|(index, file)| {
            require_path(errors, &format!("{field}[{index}]"), &file);
            resolve_relative(base, &file)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Catalogs
// ---------------------------------------------------------------------------

/// `PluginSetCatalog`: the plugin set files to load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PluginSetCatalogDeclaration {
    /// Document kind.
    pub kind: String,
    /// Plugin set declaration files.
    pub plugin_set_files: Vec<PathBuf>,
}

impl Declaration for PluginSetCatalogDeclaration {
    const KIND: &'static str = "PluginSetCatalog";
    type Output = Vec<PathBuf>;

    fn resolve(self, base: &Path) -> Result<Self::Output, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_kind(&mut errors, &self.kind, Self::KIND);
        let files = resolve_file_list(&mut errors, "plugin-set-files", self.plugin_set_files, base);
        if errors.is_empty() { Ok(files) } else { Err(errors) }
    }
}

/// `PluginRegistryCatalog`: the plugin registry files to load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PluginRegistryCatalogDeclaration {
    /// Document kind.
    pub kind: String,
    /// Plugin registry declaration files.
    pub plugin_registry_files: Vec<PathBuf>,
}

impl Declaration for PluginRegistryCatalogDeclaration {
    const KIND: &'static str = "PluginRegistryCatalog";
    type Output = Vec<PathBuf>;

    fn resolve(self, base: &Path) -> Result<Self::Output, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_kind(&mut errors, &self.kind, Self::KIND);
        let files = resolve_file_list(
            &mut errors,
            "plugin-registry-files",
            self.plugin_registry_files,
            base,
        );
        if errors.is_empty() { Ok(files) } else { Err(errors) }
    }
}

// ---------------------------------------------------------------------------
// Plugin sets
// ---------------------------------------------------------------------------

/// `PluginSet`: a source project able to build plugins.
///
/// The project root is the directory of the declaring file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PluginSetDeclaration {
    /// Document kind.
    pub kind: String,
    /// Set identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Builder backend and source directories.
    pub builder: BuilderDeclaration,
}

/// Builder section of a [`PluginSetDeclaration`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BuilderDeclaration {
    /// Builder type: `ant` or `maven`.
    #[serde(rename = "type")]
    pub builder_type: String,
    /// Main source directory override.
    #[serde(default)]
    pub main: Option<PathBuf>,
    /// Test source directory override.
    #[serde(default)]
    pub test: Option<PathBuf>,
}

impl Declaration for PluginSetDeclaration {
    const KIND: &'static str = "PluginSet";
    type Output = PluginSet;

    fn resolve(self, base: &Path) -> Result<Self::Output, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_kind(&mut errors, &self.kind, Self::KIND);
        errors.require("id", &self.id);
        errors.require("name", &self.name);
        let builder = errors.choice::<BuilderKind>("builder.type", &self.builder.builder_type);
        let Some(kind) = builder.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };

        let mut set = PluginSet::new(self.id, self.name, kind, base);
        if let Some(main) = &self.builder.main {
            set = set.with_main(expand_home(main));
        }
        if let Some(test) = &self.builder.test {
            set = set.with_test(expand_home(test));
        }
        Ok(set)
    }
}

// ---------------------------------------------------------------------------
// Plugin registries
// ---------------------------------------------------------------------------

/// `PluginRegistry`: a set of deployment layers and the plugins they hold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PluginRegistryDeclaration {
    /// Document kind.
    pub kind: String,
    /// Registry identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Deployment layout shared by every layer.
    pub layout: LayoutDeclaration,
    /// Layers in declaration order.
    pub layers: Vec<LayerDeclaration>,
    /// Plugins the registry serves.
    pub plugin_identifiers: Vec<String>,
}

/// Layout section of a [`PluginRegistryDeclaration`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LayoutDeclaration {
    /// Layout type: `directory` or `rcs`.
    #[serde(rename = "type")]
    pub layout_type: String,
    /// Naming convention for layers that do not set their own.
    #[serde(default)]
    pub file_naming_convention: Option<String>,
}

/// One entry of [`PluginRegistryDeclaration::layers`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LayerDeclaration {
    /// Layer identifier, such as `testing` or `production`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Directory deployed into.
    pub path: PathBuf,
    /// Naming convention overriding the layout's.
    #[serde(default)]
    pub file_naming_convention: Option<String>,
}

impl Declaration for PluginRegistryDeclaration {
    const KIND: &'static str = "PluginRegistry";
    type Output = PluginRegistry;

    fn resolve(self, base: &Path) -> Result<Self::Output, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_kind(&mut errors, &self.kind, Self::KIND);
        errors.require("id", &self.id);
        errors.require("name", &self.name);
        let layout = errors.choice::<RegistryLayout>("layout.type", &self.layout.layout_type);
        let layout_naming = self
            .layout
            .file_naming_convention
            .as_deref()
            .map_or(Some(FileNamingConvention::default()), |value| {
                errors.choice("layout.file-naming-convention", value)
            });

        if self.layers.is_empty() {
            errors.push("layers", "must declare at least one layer");
        }
        let mut layer_ids = HashSet::new();
        let mut layers = Vec::with_capacity(self.layers.len());
        for (index, layer) in self.layers.into_iter().enumerate() {
            let field = |name: &str| format!("layers[{index}].{name}");
            errors.require(&field("id"), &layer.id);
            errors.require(&field("name"), &layer.name);
            require_path(&mut errors, &field("path"), &layer.path);
            if !layer_ids.insert(layer.id.clone()) {
                errors.push(field("id"), format!("duplicate layer id '{}'", layer.id));
            }
            let naming = layer
                .file_naming_convention
                .as_deref()
                .map_or(layout_naming, |value| {
                    errors.choice(&field("file-naming-convention"), value)
                });
            layers.push((layer, naming));
        }

        let mut plugin_ids = HashSet::new();
        for (index, plugin_id) in self.plugin_identifiers.iter().enumerate() {
            let field = format!("plugin-identifiers[{index}]");
            errors.require(&field, plugin_id);
            if !plugin_ids.insert(plugin_id.as_str()) {
                errors.push(field, format!("duplicate identifier '{plugin_id}'"));
            }
        }

        let Some(layout) = layout.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };
        let registry = PluginRegistry::new(
            self.id,
            self.name,
            layout,
            self.plugin_identifiers.into_iter().map(PluginId::new),
        );
        Ok(layers
            .into_iter()
            .fold(registry, |registry, (layer, naming)| {
                registry.with_layer(
                    layer.id,
                    layer.name,
                    resolve_relative(base, &layer.path),
                    naming.unwrap_or_default(),
                )
            }))
    }
}

// ---------------------------------------------------------------------------
// Signing credentials
// ---------------------------------------------------------------------------

/// `PluginSigningCredentials`: the keystore and alias used for signing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PluginSigningCredentialsDeclaration {
    /// Document kind.
    pub kind: String,
    /// Keystore path.
    pub plugin_signing_keystore: PathBuf,
    /// Key alias inside the keystore.
    pub plugin_signing_alias: String,
}

impl Declaration for PluginSigningCredentialsDeclaration {
    const KIND: &'static str = "PluginSigningCredentials";
    type Output = SigningCredentials;

    fn resolve(self, base: &Path) -> Result<Self::Output, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_kind(&mut errors, &self.kind, Self::KIND);
        require_path(&mut errors, "plugin-signing-keystore", &self.plugin_signing_keystore);
        errors.require("plugin-signing-alias", &self.plugin_signing_alias);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(SigningCredentials::new(
            resolve_relative(base, &self.plugin_signing_keystore),
            self.plugin_signing_alias,
        ))
    }
}
