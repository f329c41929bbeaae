//! Path and directory management.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Suffix of in-progress downloads.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Sibling path a download is written to before being renamed into place.
pub fn temp_path(destination: &Path) -> PathBuf {
    let mut name: OsString = destination.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Whether a file exists at `path` with at least `min_bytes` bytes.
pub async fn has_valid_file(path: &Path, min_bytes: u64) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file() && meta.len() >= min_bytes.max(1),
        Err(_) => false,
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Remove zero-byte files and leftover temp files from an output directory.
///
/// Returns the number of files removed. Files that cannot be removed are
/// logged and left alone.
pub fn cleanup_incomplete_downloads(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let meta = match entry.metadata() {
            Ok(meta) if meta.is_file() => meta,
            _ => continue,
        };

        let filename = entry.file_name().to_string_lossy().into_owned();
        let is_temp = filename.ends_with(TEMP_SUFFIX);

        if meta.len() > 0 && !is_temp {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("Cleaned up incomplete download: {}", filename);
                removed += 1;
            }
            Err(e) => tracing::error!("Failed to clean up {}: {}", filename, e),
        }
    }

    Ok(removed)
}

/// Filename portion of a path for log messages.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
