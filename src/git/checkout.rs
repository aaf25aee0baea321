//! Checkout operations for git repositories
//!
//! This module handles:
//! - Checking out specific commits
//! - Turning a working tree into a plain snapshot

use std::fs;
use std::path::Path;

use git2::{Oid, Repository};

use crate::error::{Result, fs as fs_err, git};

/// Checkout a specific commit in the repository
pub fn checkout_commit(repo: &Repository, sha: &str) -> Result<()> {
    let fail = |e: git2::Error| git::checkout_failed(sha, e.message());

    let oid = Oid::from_str(sha).map_err(fail)?;
    let commit = repo.find_commit(oid).map_err(fail)?;

    // Create a detached HEAD at the commit
    repo.set_head_detached(commit.id()).map_err(fail)?;

    let mut checkout_builder = git2::build::CheckoutBuilder::new();
    checkout_builder.force().remove_untracked(true);
    repo.checkout_head(Some(&mut checkout_builder)).map_err(fail)?;

    Ok(())
}

/// Remove version-control metadata so the directory is a plain snapshot
///
/// Any handle to the repository must be dropped first.
pub fn strip_git_metadata(worktree: &Path) -> Result<()> {
    let git_dir = worktree.join(".git");
    if git_dir.is_dir() {
        fs::remove_dir_all(&git_dir).map_err(|e| {
            fs_err::io_error(format!("Failed to remove {}: {e}", git_dir.display()))
        })?;
    } else if git_dir.exists() {
        fs::remove_file(&git_dir).map_err(|e| {
            fs_err::io_error(format!("Failed to remove {}: {e}", git_dir.display()))
        })?;
    }
    Ok(())
}
