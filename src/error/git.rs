//! Git operation errors

use super::DepsError;

/// Creates a generic git operation error
pub fn operation_failed(message: impl Into<String>) -> DepsError {
    DepsError::GitOperationFailed {
        message: message.into(),
    }
}

/// Creates a clone failed error
pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> DepsError {
    DepsError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a ref resolution error
pub fn ref_resolve_failed(git_ref: impl Into<String>, reason: impl Into<String>) -> DepsError {
    DepsError::GitRefResolveFailed {
        git_ref: git_ref.into(),
        reason: reason.into(),
    }
}

/// Creates a checkout failed error
pub fn checkout_failed(sha: impl Into<String>, reason: impl Into<String>) -> DepsError {
    DepsError::GitCheckoutFailed {
        sha: sha.into(),
        reason: reason.into(),
    }
}

/// Creates a fetch failed error
pub fn fetch_failed(reason: impl Into<String>) -> DepsError {
    DepsError::GitFetchFailed {
        reason: reason.into(),
    }
}
