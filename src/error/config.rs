//! Configuration errors

use super::DepsError;

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> DepsError {
    DepsError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> DepsError {
    DepsError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates a config read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> DepsError {
    DepsError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
