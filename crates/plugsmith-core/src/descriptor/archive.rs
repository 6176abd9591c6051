//! Descriptor discovery inside packaged plugin archives.
//!
//! A signed plugin archive carries a `META-INF/MANIFEST.MF` whose per-entry
//! sections name the archive members. Exactly one section must carry the
//! `Lockss-Plugin: true` flag; its `Name` is the descriptor resource path,
//! from which the plugin identifier is recovered.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::{PluginDescriptor, PluginId};
use crate::error::DescriptorError;

/// Archive member holding the manifest.
pub const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// Manifest attribute flagging the descriptor entry.
pub const PLUGIN_FLAG_ATTRIBUTE: &str = "Lockss-Plugin";

const NAME_ATTRIBUTE: &str = "Name";

const ARCHIVE_TARGET: &str = "plugsmith_core::descriptor::archive";

/// Derives the plugin identifier of a packaged archive from its manifest.
///
/// # Errors
///
/// Returns [`DescriptorError::NoDescriptorEntry`] when no manifest section is
/// flagged, [`DescriptorError::AmbiguousDescriptorEntry`] when several are,
/// and [`DescriptorError::Archive`] when the archive cannot be read.
pub fn plugin_id_from_archive(path: &Path) -> Result<PluginId, DescriptorError> {
    let mut archive = open(path)?;
    flagged_plugin_id(path, &mut archive)
}

pub(super) fn read_descriptor(path: &Path) -> Result<PluginDescriptor, DescriptorError> {
    let mut archive = open(path)?;
    let plugin_id = flagged_plugin_id(path, &mut archive)?;
    let resource = plugin_id.resource_path();
    let member = resource.to_string_lossy().replace('\\', "/");
    let xml = read_member(path, &mut archive, &member)?;
    let origin = path.join(&member);
    PluginDescriptor::parse(&xml, &origin)
}

fn open(path: &Path) -> Result<zip::ZipArchive<File>, DescriptorError> {
    let file = File::open(path).map_err(|source| DescriptorError::Io {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })?;
    zip::ZipArchive::new(file).map_err(|err| DescriptorError::Archive {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn read_member(
    path: &Path,
    archive: &mut zip::ZipArchive<File>,
    member: &str,
) -> Result<String, DescriptorError> {
    let mut entry = archive
        .by_name(member)
        .map_err(|err| DescriptorError::Archive {
            path: path.to_path_buf(),
            message: format!("{member}: {err}"),
        })?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|err| DescriptorError::Archive {
            path: path.to_path_buf(),
            message: format!("{member}: {err}"),
        })?;
    Ok(text)
}

fn flagged_plugin_id(
    path: &Path,
    archive: &mut zip::ZipArchive<File>,
) -> Result<PluginId, DescriptorError> {
    let manifest = read_member(path, archive, MANIFEST_ENTRY)?;
    let mut flagged: Vec<PluginId> = parse_sections(&manifest)
        .iter()
        .filter(|section| {
            attribute(section, PLUGIN_FLAG_ATTRIBUTE).is_some_and(|flag| flag == "true")
        })
        .filter_map(|section| attribute(section, NAME_ATTRIBUTE))
        .filter_map(PluginId::from_resource_path)
        .collect();
    debug!(
        target: ARCHIVE_TARGET,
        archive = %path.display(),
        flagged = flagged.len(),
        "scanned archive manifest"
    );
    match flagged.len() {
        0 => Err(DescriptorError::NoDescriptorEntry {
            path: path.to_path_buf(),
        }),
        1 => flagged.pop().ok_or_else(|| DescriptorError::NoDescriptorEntry {
            path: path.to_path_buf(),
        }),
        count => Err(DescriptorError::AmbiguousDescriptorEntry {
            path: path.to_path_buf(),
            count,
        }),
    }
}

type Section = Vec<(String, String)>;

/// Splits a manifest into sections of `(name, value)` attributes.
///
/// Sections are separated by blank lines and continuation lines (starting
/// with a single space) are folded into the preceding value.
pub(crate) fn parse_sections(manifest: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Section = Vec::new();
    for line in manifest.lines() {
        if line.is_empty() {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some((_, value)) = current.last_mut() {
                value.push_str(continuation);
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            current.push((name.trim().to_owned(), value.trim_start().to_owned()));
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }
    sections
}

fn attribute<'s>(section: &'s Section, name: &str) -> Option<&'s str> {
    section
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim_end())
}
