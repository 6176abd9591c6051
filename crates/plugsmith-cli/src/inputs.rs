//! Identifier and archive lists gathered from arguments and list files.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use crate::errors::AppError;

/// List file name that reads standard input instead.
const STDIN_MARKER: &str = "-";

/// Appends the entries of every list file to `items`, in order.
///
/// Each line contributes the text before any `#`, trimmed; blank results
/// are skipped. `-` reads from `stdin`.
pub(crate) fn collect<R: BufRead>(
    mut items: Vec<String>,
    files: &[PathBuf],
    stdin: &mut R,
) -> Result<Vec<String>, AppError> {
    for file in files {
        let read = if file.as_os_str() == STDIN_MARKER {
            read_entries(&mut *stdin)
        } else {
            File::open(file).and_then(|opened| read_entries(BufReader::new(opened)))
        };
        items.extend(read.map_err(|source| AppError::ReadList {
            path: file.clone(),
            source,
        })?);
    }
    Ok(items)
}

/// Converts collected archive entries into paths.
pub(crate) fn into_paths(mut paths: Vec<PathBuf>, entries: Vec<String>) -> Vec<PathBuf> {
    paths.extend(entries.into_iter().map(PathBuf::from));
    paths
}

fn read_entries<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let text = line?;
        let entry = text
            .split_once('#')
            .map_or(text.as_str(), |(before, _)| before)
            .trim();
        if !entry.is_empty() {
            entries.push(entry.to_owned());
        }
    }
    Ok(entries)
}
