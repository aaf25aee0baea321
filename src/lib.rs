//! dlang-deps - dependency resolution for modeling-language workspaces
//!
//! Resolves git-hosted package dependencies declared in `model.yaml`, pins
//! them in `model.lock`, keeps content-addressed snapshots under
//! `~/.dlang/packages`, and maps import specifiers in source documents to
//! files on disk.
//!
//! The main entry points:
//!
//! - [`workspace::WorkspaceResolver`]: workspace discovery and the lock file
//! - [`imports::ImportResolver`]: import specifier to file path
//! - [`analysis::DependencyAnalyzer`]: trees, reverse lookups, cycles
//! - [`governance::GovernanceValidator`]: policy checks and audit reports

pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod git;
pub mod governance;
pub mod hash;
pub mod imports;
pub mod path_utils;
pub mod resolver;
pub mod settings;
pub mod source;
pub mod version;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{DepsError, Result};
