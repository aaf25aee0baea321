//! Command implementations for the dlang-deps CLI
//!
//! Commands only present results; every decision is made by the library.

pub mod audit;
pub mod cache;
pub mod completions;
pub mod cycles;
pub mod install;
pub mod resolve;
pub mod tree;
pub mod versions;
pub mod why;

use std::path::PathBuf;

use dlang_deps::error::Result;
use dlang_deps::workspace::WorkspaceResolver;

/// Directory to start workspace discovery from
pub fn start_dir(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}

/// Resolver initialized for the workspace containing `workspace` (or the cwd)
pub fn open_workspace(workspace: Option<PathBuf>) -> Result<WorkspaceResolver> {
    let resolver = WorkspaceResolver::from_env()?;
    resolver.initialize(&start_dir(workspace)?)?;
    Ok(resolver)
}

/// First seven characters of a commit hash
pub fn short_commit(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_commit() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit("abc"), "abc");
    }
}
