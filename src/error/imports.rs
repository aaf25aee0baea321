//! Import resolution errors

use std::path::Path;

use super::DepsError;

/// Creates a dependency not installed error
pub fn not_installed(package: impl Into<String>) -> DepsError {
    DepsError::DependencyNotInstalled {
        package: package.into(),
    }
}

/// Creates a dependency not declared error
pub fn not_declared(alias: impl Into<String>) -> DepsError {
    DepsError::DependencyNotDeclared {
        alias: alias.into(),
    }
}

/// Creates an import not found error listing every candidate that was tried
pub fn not_found(specifier: impl Into<String>, candidates: &[&Path]) -> DepsError {
    let candidates = candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    DepsError::ImportNotFound {
        specifier: specifier.into(),
        candidates,
    }
}
