//! Path expansion shared by every declaration.

use std::path::{Path, PathBuf};

/// Expands a leading `~` component to the user's home directory.
///
/// Paths naming another user (`~alice/...`) and paths without a leading
/// tilde are returned unchanged, as is everything when no home directory
/// is known.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) if rest.as_os_str().is_empty() => home,
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Expands `path` and resolves it against `base` unless it is absolute.
#[must_use]
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    base.join(expand_home(path))
}
