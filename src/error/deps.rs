//! Dependency graph and version errors

use super::DepsError;

/// Creates an invalid dependency declaration error
pub fn invalid(alias: impl Into<String>, reason: impl Into<String>) -> DepsError {
    DepsError::InvalidDependency {
        alias: alias.into(),
        reason: reason.into(),
    }
}

/// Creates an unresolved version error
pub fn unresolved_version(package: impl Into<String>) -> DepsError {
    DepsError::UnresolvedVersion {
        package: package.into(),
    }
}
