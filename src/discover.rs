use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// File-name prefix the workshop pipeline gives its temporary archives
pub const ARCHIVE_PREFIX: &str = "TempArchive";

/// List the archive files in a directory, sorted by name.
///
/// Matches regular files whose name starts with [`ARCHIVE_PREFIX`];
/// subdirectories are not descended into.
pub fn discover_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(ARCHIVE_PREFIX) {
            found.push(entry.path());
        }
    }
    found.sort();
    tracing::debug!(dir = %dir.display(), count = found.len(), "discovered archives");
    Ok(found)
}
