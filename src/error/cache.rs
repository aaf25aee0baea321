//! Cache errors

use super::DepsError;

/// Creates a cache operation failed error
pub fn operation_failed(message: impl Into<String>) -> DepsError {
    DepsError::CacheOperationFailed {
        message: message.into(),
    }
}
