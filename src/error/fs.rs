//! File system errors

use super::DepsError;

/// Creates a write failed error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> DepsError {
    DepsError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> DepsError {
    DepsError::IoError {
        message: message.into(),
    }
}
