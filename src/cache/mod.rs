//! Content-addressed snapshot cache
//!
//! Layout: `<cache_root>/<platform>/<owner>/<repo>/<commit>/`, one plain
//! (no `.git`) snapshot per resolved commit. The directory name is always
//! the full commit hash, so every ref resolving to the same commit shares
//! one entry.
//!
//! Entries appear only by renaming a finished snapshot out of a `.tmp-`
//! staging directory that lives next to the final location. Anything whose
//! name starts with `.` is staging and never counts as a cache entry.

mod stats;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{Result, cache};

pub use stats::{CacheStats, cache_stats, clear_cache};

/// Prefix of in-progress staging directories
pub const STAGING_PREFIX: &str = ".tmp-";

/// Replace characters that are awkward in directory names (`host:port`)
fn path_segment(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, ':' | '\\' | '/') { '_' } else { c })
        .collect()
}

/// Directory holding every cached commit of one repository
pub fn repository_dir(cache_root: &Path, platform: &str, owner: &str, repo: &str) -> PathBuf {
    cache_root
        .join(path_segment(platform))
        .join(path_segment(owner))
        .join(path_segment(repo))
}

/// Snapshot directory for one commit
pub fn snapshot_dir(
    cache_root: &Path,
    platform: &str,
    owner: &str,
    repo: &str,
    commit: &str,
) -> PathBuf {
    repository_dir(cache_root, platform, owner, repo).join(commit)
}

/// Whether `path` is a usable cache entry: an existing, non-empty directory
pub fn is_populated(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_some())
}

/// Create a staging directory next to `target`
///
/// The directory is removed when the returned guard drops, so an abandoned
/// materialization leaves nothing behind that looks like a cache hit.
pub fn staging_dir(target: &Path) -> Result<TempDir> {
    let parent = target.parent().ok_or_else(|| {
        cache::operation_failed(format!("{} has no parent directory", target.display()))
    })?;
    fs::create_dir_all(parent).map_err(|e| {
        cache::operation_failed(format!("Failed to create {}: {e}", parent.display()))
    })?;

    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| cache::operation_failed(format!("Failed to create staging directory: {e}")))
}

/// Atomically move a finished snapshot into its final location
///
/// When another writer got there first the existing entry wins and the
/// staged copy is left for its guard to clean up.
pub fn publish(staged: &Path, target: &Path) -> Result<()> {
    match fs::rename(staged, target) {
        Ok(()) => {
            debug!(path = %target.display(), "published cache entry");
            Ok(())
        }
        Err(_) if is_populated(target) => {
            debug!(path = %target.display(), "cache entry already published by another writer");
            Ok(())
        }
        Err(e) => Err(cache::operation_failed(format!(
            "Failed to move snapshot into {}: {e}",
            target.display()
        ))),
    }
}
