//! Error types and handling for dlang-deps
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`workspace`]: Workspace discovery errors
//! - [`source`]: Specifier parsing and source resolution errors
//! - [`git`]: Git operation errors
//! - [`imports`]: Import resolution errors
//! - [`deps`]: Dependency graph and version errors
//! - [`config`]: Manifest and lock file errors
//! - [`fs`]: File system errors
//! - [`cache`]: Cache errors
//!
//! Governance findings are not errors; they are returned as
//! [`crate::governance::GovernanceViolation`] values.

pub mod cache;
pub mod config;
pub mod deps;
pub mod fs;
pub mod git;
pub mod imports;
pub mod source;
pub mod workspace;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for dependency resolution
#[derive(Error, Diagnostic, Debug)]
pub enum DepsError {
    // Workspace errors
    #[error("No model.yaml found in '{path}' or any parent directory")]
    #[diagnostic(
        code(dlang::workspace::not_found),
        help("Create a model.yaml at the root of your workspace")
    )]
    WorkspaceNotFound { path: String },

    #[error("Workspace has not been initialized")]
    #[diagnostic(code(dlang::workspace::not_initialized))]
    WorkspaceNotInitialized,

    // Source errors
    #[error("Invalid dependency specifier '{specifier}': {reason}")]
    #[diagnostic(
        code(dlang::source::invalid_specifier),
        help("Valid formats: owner/repo@ref, owner/repo/path@ref, github:owner/repo, https://host/owner/repo")
    )]
    InvalidSpecifier { specifier: String, reason: String },

    #[error("Failed to resolve '{specifier}': {reason}")]
    #[diagnostic(
        code(dlang::source::resolution_failed),
        help("Check that the repository exists and that the ref is spelled correctly")
    )]
    SourceResolutionFailed { specifier: String, reason: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(dlang::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(dlang::git::clone_failed),
        help("Check that URL is correct and you have access to repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to resolve git ref '{git_ref}': {reason}")]
    #[diagnostic(code(dlang::git::ref_resolve_failed))]
    GitRefResolveFailed { git_ref: String, reason: String },

    #[error("Failed to checkout commit '{sha}': {reason}")]
    #[diagnostic(code(dlang::git::checkout_failed))]
    GitCheckoutFailed { sha: String, reason: String },

    #[error("Failed to fetch from remote: {reason}")]
    #[diagnostic(code(dlang::git::fetch_failed))]
    GitFetchFailed { reason: String },

    // Import errors
    #[error("Cannot resolve external import '{specifier}' without a model.yaml")]
    #[diagnostic(
        code(dlang::imports::manifest_required),
        help("Create a model.yaml and declare the dependency under 'dependencies'")
    )]
    ManifestRequired { specifier: String },

    #[error("Dependency '{package}' is not installed")]
    #[diagnostic(
        code(dlang::imports::not_installed),
        help("Run 'dlang-deps install' to fetch dependencies and write model.lock")
    )]
    DependencyNotInstalled { package: String },

    #[error("Dependency '{alias}' is not declared in model.yaml")]
    #[diagnostic(
        code(dlang::imports::not_declared),
        help("Add it under 'dependencies' in model.yaml, then run 'dlang-deps install'")
    )]
    DependencyNotDeclared { alias: String },

    #[error("Unknown path alias '{alias}'")]
    #[diagnostic(
        code(dlang::imports::unknown_alias),
        help("Declare the alias under 'paths' in model.yaml")
    )]
    UnknownAlias { alias: String },

    #[error("Import '{specifier}' not found (tried: {candidates})")]
    #[diagnostic(code(dlang::imports::not_found))]
    ImportNotFound {
        specifier: String,
        candidates: String,
    },

    #[error("Import '{specifier}' has extension '.{extension}', expected '.{expected}'")]
    #[diagnostic(
        code(dlang::imports::invalid_extension),
        help("Omit the extension or use the language's default extension")
    )]
    InvalidExtension {
        specifier: String,
        extension: String,
        expected: String,
    },

    // Dependency errors
    #[error("Could not resolve a version for '{package}'")]
    #[diagnostic(code(dlang::deps::unresolved_version))]
    UnresolvedVersion { package: String },

    #[error("Invalid dependency '{alias}': {reason}")]
    #[diagnostic(
        code(dlang::deps::invalid),
        help("Each dependency needs either 'source' and 'ref', or a relative 'path'")
    )]
    InvalidDependency { alias: String, reason: String },

    #[error("No version of '{package}' satisfies policy '{policy}'")]
    #[diagnostic(code(dlang::deps::no_matching_version))]
    NoMatchingVersion { package: String, policy: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(dlang::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(dlang::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(dlang::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(dlang::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(dlang::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(dlang::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(dlang::fs::io_error))]
    IoError { message: String },

    // Cache errors
    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(dlang::cache::operation_failed))]
    CacheOperationFailed { message: String },
}

impl DepsError {
    /// Whether the user can fix this by editing model.yaml or running install
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            DepsError::ManifestRequired { .. }
                | DepsError::DependencyNotInstalled { .. }
                | DepsError::DependencyNotDeclared { .. }
                | DepsError::UnknownAlias { .. }
                | DepsError::ImportNotFound { .. }
                | DepsError::InvalidExtension { .. }
                | DepsError::InvalidDependency { .. }
        )
    }
}

impl From<std::io::Error> for DepsError {
    fn from(err: std::io::Error) -> Self {
        DepsError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for DepsError {
    fn from(err: serde_yaml::Error) -> Self {
        DepsError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DepsError {
    fn from(err: serde_json::Error) -> Self {
        DepsError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for DepsError {
    fn from(err: git2::Error) -> Self {
        DepsError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, DepsError>;

#[cfg(test)]
mod tests;
