//! Filesystem helpers for cache files and manifest-relative paths.

use std::path::{Path, PathBuf};
use tokio::fs;

/// Write a cache file, creating parent directories. Failures are logged and
/// swallowed: a missing cache only costs a refetch next time.
pub async fn write_cache_file(path: &Path, bytes: &[u8]) -> bool {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent).await {
            log::warn!("Failed to write cache file {:?}: {}", path, e);
            return false;
        }
    }
    match fs::write(path, bytes).await {
        Ok(()) => {
            log::debug!("Wrote cache file {:?} ({} bytes)", path, bytes.len());
            true
        }
        Err(e) => {
            log::warn!("Failed to write cache file {:?}: {}", path, e);
            false
        }
    }
}

/// Normalise a `/`-separated manifest path to host syntax.
///
/// The result always stays below the directory it is joined onto: `..`
/// segments and drive or root prefixes are dropped.
pub fn relative_path(path: &str) -> PathBuf {
    let mut relative = PathBuf::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => log::warn!("Ignoring parent segment in manifest path '{}'", path),
            s if s.contains(':') => {
                log::warn!("Ignoring prefix segment '{}' in manifest path '{}'", s, path)
            }
            s => relative.push(s),
        }
    }
    relative
}
