//! Workspace errors

use super::DepsError;

/// Creates a workspace not found error
pub fn not_found(path: impl Into<String>) -> DepsError {
    DepsError::WorkspaceNotFound { path: path.into() }
}
