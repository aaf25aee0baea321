//! Lexical path helpers
//!
//! Import specifiers and `path` dependencies are joined without touching the
//! filesystem, so a target that does not exist yet still produces a stable
//! path for error messages.

use std::path::{Component, Path, PathBuf};

/// Join `relative` onto `base`, folding `.` and `..` components
///
/// `..` never climbs above the root of `base`. An absolute `relative`
/// replaces `base`, like [`Path::join`].
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use dlang_deps::path_utils::lexical_join;
///
/// assert_eq!(
///     lexical_join(Path::new("/ws/models"), "../shared/./types"),
///     PathBuf::from("/ws/shared/types")
/// );
/// ```
pub fn lexical_join(base: &Path, relative: impl AsRef<Path>) -> PathBuf {
    let mut out = PathBuf::new();
    for component in base.join(relative.as_ref()).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Render a path with `/` separators regardless of platform
pub fn to_forward_slashes(path: &Path) -> String {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether an import specifier is relative to the importing file (`./x`, `../x`)
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}
