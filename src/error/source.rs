//! Specifier parsing and source resolution errors

use super::DepsError;

/// Creates an invalid specifier error
pub fn invalid_specifier(specifier: impl Into<String>, reason: impl Into<String>) -> DepsError {
    DepsError::InvalidSpecifier {
        specifier: specifier.into(),
        reason: reason.into(),
    }
}

/// Wraps a lower-level failure so it names the offending specifier
pub fn resolution_failed(specifier: impl Into<String>, err: &DepsError) -> DepsError {
    DepsError::SourceResolutionFailed {
        specifier: specifier.into(),
        reason: err.to_string(),
    }
}
