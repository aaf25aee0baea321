//! Install command implementation
//!
//! Resolves the manifest's dependencies into model.lock (or reuses the
//! existing lock) and makes sure every locked snapshot is in the cache.

use std::path::PathBuf;

use console::style;
use tracing::debug;

use dlang_deps::config::LockFile;
use dlang_deps::error::Result;
use dlang_deps::source::ResolveOptions;
use dlang_deps::workspace::WorkspaceResolver;

use super::{open_workspace, short_commit};
use crate::cli::InstallArgs;

/// Run install command
pub fn run(workspace: Option<PathBuf>, args: InstallArgs) -> Result<()> {
    let resolver = open_workspace(workspace)?;

    let lock = if args.update {
        resolver.regenerate_lock_file()?
    } else {
        resolver.ensure_lock_file()?
    };

    fetch_missing(&resolver, &lock)?;

    if lock.is_empty() {
        println!("No git dependencies to install.");
        return Ok(());
    }

    println!(
        "{} {} {}",
        style(if args.update { "Updated" } else { "Locked" })
            .green()
            .bold(),
        lock.len(),
        if lock.len() == 1 { "dependency" } else { "dependencies" }
    );
    for (package_key, locked) in &lock.dependencies {
        println!(
            "  {}@{} {}",
            style(package_key).cyan(),
            locked.version,
            style(short_commit(&locked.commit)).dim()
        );
    }
    Ok(())
}

/// Populate snapshots a fresh cache (or a copied lock file) lacks
fn fetch_missing(resolver: &WorkspaceResolver, lock: &LockFile) -> Result<()> {
    let sources = resolver.sources();
    for (package_key, locked) in &lock.dependencies {
        debug!(package = %package_key, "ensuring snapshot");
        sources.resolve(
            &format!("{}@{}", locked.resolved, locked.commit),
            ResolveOptions::ONLINE,
        )?;
    }
    Ok(())
}
