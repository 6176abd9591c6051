//! Plugin identifiers and descriptors.
//!
//! A plugin is declared by an XML descriptor whose root element is a `map` of
//! `entry` pairs: a `string` key followed by a value element. The descriptor
//! lives either in a source tree, at the resource path derived from the
//! plugin identifier, or inside a signed archive whose manifest flags exactly
//! one entry as the plugin descriptor (see [`archive`]).

pub mod archive;


use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

pub use self::archive::plugin_id_from_archive;

/// File suffix of a plugin descriptor resource.
pub const DESCRIPTOR_SUFFIX: &str = ".xml";

const ROOT_ELEMENT: &str = "map";
const KEY_IDENTIFIER: &str = "plugin_identifier";
const KEY_NAME: &str = "plugin_name";
const KEY_VERSION: &str = "plugin_version";
const KEY_PARENT: &str = "plugin_parent";
const KEY_PARENT_VERSION: &str = "plugin_parent_version";
const KEY_AUX_PACKAGES: &str = "plugin_aux_packages";

/// Dotted name uniquely identifying a plugin definition.
///
/// The identifier maps onto a descriptor resource path by turning each dot
/// into a path separator and appending [`DESCRIPTOR_SUFFIX`]; the mapping is
/// reversible.
///
/// # Example
///
/// ```
/// use plugsmith_core::PluginId;
///
/// let id = PluginId::new("org.example.MyPlugin");
/// let path = id.resource_path();
/// assert_eq!(path.to_str(), Some("org/example/MyPlugin.xml"));
/// assert_eq!(PluginId::from_resource_path(&path), Some(id));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    /// Wraps a dotted identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the final dotted component (`MyPlugin` for
    /// `org.example.MyPlugin`).
    #[must_use]
    pub fn last_component(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(self.0.as_str())
    }

    /// Returns the descriptor resource path relative to a source root.
    #[must_use]
    pub fn resource_path(&self) -> PathBuf {
        let mut path: PathBuf = self.0.split('.').collect();
        path.set_file_name(format!("{}{DESCRIPTOR_SUFFIX}", self.last_component()));
        path
    }

    /// Returns the directory containing the descriptor resource.
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.resource_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Recovers an identifier from a descriptor resource path.
    ///
    /// Returns `None` when the path is not relative, contains anything other
    /// than plain components, or lacks the descriptor suffix.
    #[must_use]
    pub fn from_resource_path(path: impl AsRef<Path>) -> Option<Self> {
        let mut parts = Vec::new();
        for component in path.as_ref().components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                _ => return None,
            }
        }
        let file = parts.pop()?;
        let stem = file.strip_suffix(DESCRIPTOR_SUFFIX)?;
        if stem.is_empty() {
            return None;
        }
        parts.push(stem);
        Some(Self(parts.join(".")))
    }
}

/// Returns the source directory of a dotted package name.
///
/// Auxiliary packages are declared as packages rather than plugins, so their
/// directory is the package path itself.
#[must_use]
pub fn package_dir_of(package: &str) -> PathBuf {
    package.split('.').collect()
}

impl std::fmt::Display for PluginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PluginId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for PluginId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PluginId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Parsed plugin metadata.
///
/// Identifier and version are mandatory; every other field is optional and
/// reported as an empty value when absent. The parent reference is a plain
/// identifier used for lookup only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    identifier: PluginId,
    name: Option<String>,
    version: u32,
    parent_identifier: Option<PluginId>,
    parent_version: Option<u32>,
    aux_packages: Vec<String>,
}

impl PluginDescriptor {
    /// Reads and parses a descriptor file from a source tree.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Io`] if the file cannot be read, or any
    /// parse error from [`PluginDescriptor::parse`].
    pub fn from_path(path: &Path) -> Result<Self, DescriptorError> {
        let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        Self::parse(&text, path)
    }

    /// Reads the flagged descriptor from a packaged archive.
    ///
    /// # Errors
    ///
    /// Returns a discovery error if the archive manifest does not flag
    /// exactly one descriptor, or any parse error from
    /// [`PluginDescriptor::parse`].
    pub fn from_archive(path: &Path) -> Result<Self, DescriptorError> {
        archive::read_descriptor(path)
    }

    /// Parses descriptor XML; `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::InvalidRoot`] when the root element is not a
    /// `map`, [`DescriptorError::MissingField`] when the identifier or version
    /// is absent, and [`DescriptorError::DuplicateEntry`] or
    /// [`DescriptorError::InvalidField`] for malformed entries.
    pub fn parse(xml: &str, origin: &Path) -> Result<Self, DescriptorError> {
        let document = roxmltree::Document::parse(xml).map_err(|source| DescriptorError::Xml {
            path: origin.to_path_buf(),
            source,
        })?;
        let root = document.root_element();
        if !root.has_tag_name(ROOT_ELEMENT) {
            return Err(DescriptorError::InvalidRoot {
                path: origin.to_path_buf(),
                found: root.tag_name().name().to_owned(),
            });
        }
        let entries = Entries { root, origin };

        let identifier = entries
            .text(KEY_IDENTIFIER)?
            .ok_or_else(|| entries.missing(KEY_IDENTIFIER))?;
        let version = entries
            .positive(KEY_VERSION)?
            .ok_or_else(|| entries.missing(KEY_VERSION))?;

        Ok(Self {
            identifier: PluginId::new(identifier),
            name: entries.text(KEY_NAME)?,
            version,
            parent_identifier: entries.text(KEY_PARENT)?.map(PluginId::new),
            parent_version: entries.positive(KEY_PARENT_VERSION)?,
            aux_packages: entries.list(KEY_AUX_PACKAGES)?,
        })
    }

    /// Returns the plugin identifier.
    #[must_use]
    pub const fn identifier(&self) -> &PluginId {
        &self.identifier
    }

    /// Returns the human-readable plugin name, if declared.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the plugin version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the parent plugin identifier, if any.
    #[must_use]
    pub const fn parent_identifier(&self) -> Option<&PluginId> {
        self.parent_identifier.as_ref()
    }

    /// Returns the declared parent version, if any.
    #[must_use]
    pub const fn parent_version(&self) -> Option<u32> {
        self.parent_version
    }

    /// Returns the auxiliary packages bundled with the plugin.
    #[must_use]
    pub fn aux_packages(&self) -> &[String] {
        &self.aux_packages
    }
}

/// Keyed view over the `entry` children of a descriptor root.
struct Entries<'a, 'input> {
    root: roxmltree::Node<'a, 'input>,
    origin: &'a Path,
}

impl<'a, 'input> Entries<'a, 'input> {
    /// Returns the value element of the single entry named `key`.
    fn value(
        &self,
        key: &'static str,
    ) -> Result<Option<roxmltree::Node<'a, 'input>>, DescriptorError> {
        let matches: Vec<_> = self
            .root
            .children()
            .filter(|node| node.has_tag_name("entry"))
            .filter_map(|entry| {
                let mut elements = entry.children().filter(roxmltree::Node::is_element);
                let first = elements.next()?;
                let is_key =
                    first.has_tag_name("string") && first.text().map(str::trim) == Some(key);
                if is_key { elements.next() } else { None }
            })
            .collect();
        match matches.as_slice() {
            [] => Ok(None),
            [value] => Ok(Some(*value)),
            more => Err(DescriptorError::DuplicateEntry {
                path: self.origin.to_path_buf(),
                field: key,
                count: more.len(),
            }),
        }
    }

    fn text(&self, key: &'static str) -> Result<Option<String>, DescriptorError> {
        Ok(self
            .value(key)?
            .and_then(|node| node.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned))
    }

    fn positive(&self, key: &'static str) -> Result<Option<u32>, DescriptorError> {
        let Some(raw) = self.text(key)? else {
            return Ok(None);
        };
        match raw.parse::<u32>() {
            Ok(value) if value > 0 => Ok(Some(value)),
            _ => Err(DescriptorError::InvalidField {
                path: self.origin.to_path_buf(),
                field: key,
                value: raw,
            }),
        }
    }

    fn list(&self, key: &'static str) -> Result<Vec<String>, DescriptorError> {
        let Some(list) = self.value(key)? else {
            return Ok(Vec::new());
        };
        if !list.has_tag_name("list") {
            return Err(DescriptorError::InvalidField {
                path: self.origin.to_path_buf(),
                field: key,
                value: list.tag_name().name().to_owned(),
            });
        }
        Ok(list
            .children()
            .filter(|node| node.has_tag_name("string"))
            .filter_map(|node| node.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
            .collect())
    }

    fn missing(&self, field: &'static str) -> DescriptorError {
        DescriptorError::MissingField {
            path: self.origin.to_path_buf(),
            field,
        }
    }
}
