//! URL normalization for git operations
//!
//! This module handles:
//! - Normalizing SSH URLs from SCP-style to ssh:// format
//! - Normalizing file:// URLs for libgit2 compatibility

use std::borrow::Cow;
use std::path::Path;

/// Whether a URL points at the local filesystem
///
/// Local URLs are never cloned shallow: libgit2 does not support depth for
/// the local transport.
pub fn is_local_url(url: &str) -> bool {
    url.starts_with("file://") || url.starts_with('/') || Path::new(url).is_absolute()
}

/// Normalize SSH URLs from SCP-style (git@host:path) to ssh:// format.
pub(crate) fn normalize_ssh_url(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }

    match url.split_once(':') {
        Some((host_part, path_part)) => {
            let path_part = path_part.trim_start_matches('/');
            Cow::Owned(format!("ssh://{host_part}/{path_part}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Normalize file:// URLs so libgit2 can resolve them on Unix.
pub(crate) fn normalize_file_url(url: &str) -> Cow<'_, str> {
    let Some(after) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };
    if after.contains('\\') {
        return Cow::Owned(format!("file:///{}", after.replace('\\', "/").trim_start_matches('/')));
    }
    if !after.is_empty() && !after.starts_with('/') {
        return Cow::Owned(format!("file:///{after}"));
    }
    Cow::Borrowed(url)
}

/// Apply every normalization libgit2 needs before touching the network
pub(crate) fn normalize_for_git(url: &str) -> String {
    let url = normalize_ssh_url(url);
    normalize_file_url(&url).into_owned()
}
