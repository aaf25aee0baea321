//! Cache statistics and maintenance

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Result, cache};

/// Cache statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of distinct repositories (`platform/owner/repo`)
    pub repositories: usize,
    /// Number of cached commits across all repositories
    pub versions: usize,
    /// Total size in bytes
    pub total_size: u64,
}

impl CacheStats {
    /// Format total size as human-readable string
    #[allow(clippy::cast_precision_loss)]
    pub fn formatted_size(&self) -> String {
        let size = self.total_size as f64;
        if size < 1024.0 {
            format!("{} B", self.total_size)
        } else if size < 1024.0 * 1024.0 {
            format!("{:.1} KB", size / 1024.0)
        } else if size < 1024.0 * 1024.0 * 1024.0 {
            format!("{:.1} MB", size / (1024.0 * 1024.0))
        } else {
            format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
        }
    }
}

fn is_staging(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

fn subdirs(path: &Path) -> Result<Vec<std::path::PathBuf>> {
    let entries = fs::read_dir(path).map_err(|e| {
        cache::operation_failed(format!("Failed to read {}: {e}", path.display()))
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| cache::operation_failed(format!("Failed to read entry: {e}")))?;
        let path = entry.path();
        if path.is_dir() && !is_staging(&path) {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

/// Get cache statistics
///
/// Walks `<platform>/<owner>/<repo>/<commit>`; staging directories are not
/// counted.
pub fn cache_stats(cache_root: &Path) -> Result<CacheStats> {
    if !cache_root.exists() {
        return Ok(CacheStats::default());
    }

    let mut stats = CacheStats::default();
    for platform in subdirs(cache_root)? {
        for owner in subdirs(&platform)? {
            for repo in subdirs(&owner)? {
                let commits = subdirs(&repo)?;
                if commits.is_empty() {
                    continue;
                }
                stats.repositories += 1;
                stats.versions += commits.len();
                for commit in &commits {
                    stats.total_size += dir_size(commit)?;
                }
            }
        }
    }

    Ok(stats)
}

/// Remove every cached snapshot
pub fn clear_cache(cache_root: &Path) -> Result<()> {
    if cache_root.exists() {
        fs::remove_dir_all(cache_root)
            .map_err(|e| cache::operation_failed(format!("Failed to clear cache: {e}")))?;
    }
    Ok(())
}

/// Calculate directory size recursively
fn dir_size(path: &Path) -> Result<u64> {
    let mut size = 0u64;
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if entry.file_type().is_file() {
            size += entry
                .metadata()
                .map_err(|e| cache::operation_failed(format!("Failed to get metadata: {e}")))?
                .len();
        }
    }
    Ok(size)
}
