//! Workspace root discovery
//!
//! A workspace root is the nearest ancestor directory (the start directory
//! included) that contains `model.yaml`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, workspace};
use crate::settings::MANIFEST_FILE;

/// Whether `dir` holds a manifest
pub fn exists(dir: &Path) -> bool {
    dir.join(MANIFEST_FILE).is_file()
}

/// Walk upward from `start` to the first directory holding a manifest
pub fn find_from(start: &Path) -> Option<PathBuf> {
    start.ancestors().find(|dir| exists(dir)).map(Path::to_path_buf)
}

/// Absolute workspace root for `start`, which may be a file or a directory
///
/// # Errors
///
/// `WorkspaceNotFound` when the filesystem root is reached without finding
/// a manifest.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(start)?;
    let absolute = dunce::canonicalize(&absolute).unwrap_or(absolute);
    let dir = if absolute.is_file() {
        absolute.parent().map_or_else(|| absolute.clone(), Path::to_path_buf)
    } else {
        absolute
    };

    let root = find_from(&dir).ok_or_else(|| workspace::not_found(start.display().to_string()))?;
    let root = dunce::canonicalize(&root).unwrap_or(root);
    debug!(root = %root.display(), "found workspace root");
    Ok(root)
}
