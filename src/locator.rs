//! Unit location and discovery
//!
//! Each unit owns a directory `<input_root>/<unit>` holding one or more
//! description files somewhere beneath it. Only the first one found is used.

use crate::error::UnitError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Locate the description file for `unit` under `input_root`.
///
/// Searches recursively for files with exactly the given extension,
/// following symlinks and skipping hidden files and directories. Traversal
/// is sorted by file name so repeated runs pick the same file when a unit
/// has several. Unreadable entries are skipped.
pub fn locate_description(
    unit: &str,
    input_root: &Path,
    extension: &str,
) -> Result<PathBuf, UnitError> {
    let unit_root = input_root.join(unit);

    let found = WalkDir::new(&unit_root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .find(|path| has_extension(path, extension));

    match found {
        Some(path) => {
            debug!(unit, path = %path.display(), "Located description file");
            Ok(path)
        }
        None => Err(UnitError::NotFound {
            unit: unit.to_string(),
            root: unit_root,
        }),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().map(|ext| ext == extension).unwrap_or(false)
}

/// List every unit under `input_root`: its immediate non-hidden
/// subdirectories, sorted.
pub fn discover_units(input_root: &Path) -> Result<Vec<String>, UnitError> {
    let entries = std::fs::read_dir(input_root).map_err(|e| UnitError::io(input_root, e))?;

    let mut units = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| UnitError::io(input_root, e))?;
        let file_type = entry.file_type().map_err(|e| UnitError::io(entry.path(), e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if file_type.is_dir() && !name.starts_with('.') {
            units.push(name);
        }
    }
    units.sort();
    Ok(units)
}
