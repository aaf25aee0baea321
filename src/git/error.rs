//! Git error interpretation
//!
//! libgit2 messages are noisy and transport-specific. Clone, fetch and
//! ref-listing failures are collapsed into a short reason that ends up in
//! `SourceResolutionFailed`.

use git2::{Error, ErrorClass};

#[derive(Clone, Copy)]
enum Category {
    RepositoryNotFound,
    AuthenticationFailed,
    PermissionDenied,
    NetworkError,
    Certificate,
    Ssl,
}

type Check = fn(&str, ErrorClass) -> bool;

const CATEGORIES: &[(Check, Category)] = &[
    (
        |msg, _| {
            msg.contains("not found")
                || msg.contains("404")
                || msg.contains("does not exist")
                || msg.contains("too many redirects")
                || msg.contains("authentication replays")
        },
        Category::RepositoryNotFound,
    ),
    (
        |msg, _| msg.contains("authentication") || msg.contains("credentials"),
        Category::AuthenticationFailed,
    ),
    (
        |msg, _| msg.contains("permission denied") || msg.contains("access denied"),
        Category::PermissionDenied,
    ),
    (
        |msg, _| {
            msg.contains("connection")
                || msg.contains("network")
                || msg.contains("timeout")
                || msg.contains("timed out")
        },
        Category::NetworkError,
    ),
    (
        |msg, class| class == ErrorClass::Http && msg.contains("certificate"),
        Category::Certificate,
    ),
    (
        |msg, class| class == ErrorClass::Http && msg.contains("ssl"),
        Category::Ssl,
    ),
];

/// Interpret a git2 error and provide a more user-friendly message
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();
    let category = CATEGORIES
        .iter()
        .find(|(check, _)| check(&message, err.class()))
        .map(|(_, category)| *category);

    match category {
        Some(Category::RepositoryNotFound) => "Repository not found".to_string(),
        Some(Category::AuthenticationFailed) => "Authentication failed".to_string(),
        Some(Category::PermissionDenied) => "Permission denied".to_string(),
        Some(Category::NetworkError) => "Network error".to_string(),
        Some(Category::Certificate) => "Certificate error".to_string(),
        Some(Category::Ssl) => "SSL error".to_string(),
        None => match err.class() {
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::ErrorCode;

    #[test]
    fn test_not_found() {
        let err = Error::new(ErrorCode::NotFound, ErrorClass::Net, "repository not found");
        assert_eq!(interpret_git_error(&err), "Repository not found");
    }

    #[test]
    fn test_network() {
        let err = Error::new(ErrorCode::GenericError, ErrorClass::Net, "connection timed out");
        assert_eq!(interpret_git_error(&err), "Network error");
    }

    #[test]
    fn test_ssh_passthrough() {
        let err = Error::new(ErrorCode::GenericError, ErrorClass::Ssh, "handshake failed");
        assert_eq!(interpret_git_error(&err), "SSH error: handshake failed");
    }

    #[test]
    fn test_other_passthrough() {
        let err = Error::new(ErrorCode::GenericError, ErrorClass::Odb, "object missing");
        assert_eq!(interpret_git_error(&err), "object missing");
    }
}
