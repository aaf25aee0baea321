//! Process-level settings
//!
//! Everything here comes from the environment; manifests never override it.
//!
//! | Variable                 | Default              |
//! |--------------------------|----------------------|
//! | `DLANG_CACHE_DIR`        | `~/.dlang/packages`  |
//! | `DLANG_GIT_HOST`         | `https://github.com` |
//! | `DLANG_CONFIG_TTL_SECS`  | `300`                |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DepsError, Result};

/// Dotfile directory under the user's home
const HOME_DIR: &str = ".dlang";

/// Packages subdirectory holding the content-addressed cache
const PACKAGES_DIR: &str = "packages";

/// Host used for `owner/repo` shorthand specifiers
pub const DEFAULT_GIT_HOST: &str = "https://github.com";

/// Default lifetime of in-memory manifest and lock file entries
pub const DEFAULT_CONFIG_TTL: Duration = Duration::from_secs(300);

/// Manifest filename
pub const MANIFEST_FILE: &str = "model.yaml";

/// Lock filename
pub const LOCK_FILE: &str = "model.lock";

/// Source file extension, without the dot
pub const SOURCE_EXTENSION: &str = "dlang";

/// Resolved settings for one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the on-disk package cache
    pub cache_root: PathBuf,

    /// Base URL for shorthand specifiers (e.g. `https://github.com` or a `file://` mirror)
    pub git_host: String,

    /// Lifetime of in-memory config cache entries
    pub config_ttl: Duration,
}

impl Settings {
    /// Read settings from the environment
    pub fn from_env() -> Result<Self> {
        let cache_root = match std::env::var("DLANG_CACHE_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_cache_root()?,
        };

        let git_host = std::env::var("DLANG_GIT_HOST")
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_GIT_HOST.to_string());

        let config_ttl = match std::env::var("DLANG_CONFIG_TTL_SECS") {
            Ok(secs) => Duration::from_secs(secs.trim().parse().map_err(|_| {
                DepsError::ConfigInvalid {
                    message: format!("DLANG_CONFIG_TTL_SECS must be a number, got '{secs}'"),
                }
            })?),
            Err(_) => DEFAULT_CONFIG_TTL,
        };

        Ok(Self {
            cache_root,
            git_host: git_host.trim_end_matches('/').to_string(),
            config_ttl,
        })
    }

    /// Settings rooted at an explicit cache directory, with defaults elsewhere
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            git_host: DEFAULT_GIT_HOST.to_string(),
            config_ttl: DEFAULT_CONFIG_TTL,
        }
    }

    /// Override the shorthand host
    #[must_use]
    pub fn git_host(mut self, host: impl Into<String>) -> Self {
        self.git_host = host.into().trim_end_matches('/').to_string();
        self
    }
}

/// `~/.dlang/packages`
pub fn default_cache_root() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| DepsError::CacheOperationFailed {
        message: "Could not determine home directory".to_string(),
    })?;
    Ok(home.join(HOME_DIR).join(PACKAGES_DIR))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        // SAFETY: tests touching the environment are serialized
        unsafe {
            std::env::remove_var("DLANG_CACHE_DIR");
            std::env::remove_var("DLANG_GIT_HOST");
            std::env::remove_var("DLANG_CONFIG_TTL_SECS");
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::from_env().unwrap();
        assert!(settings.cache_root.ends_with(".dlang/packages"));
        assert_eq!(settings.git_host, DEFAULT_GIT_HOST);
        assert_eq!(settings.config_ttl, DEFAULT_CONFIG_TTL);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        // SAFETY: serialized with other env tests
        unsafe {
            std::env::set_var("DLANG_CACHE_DIR", "/tmp/dlang-cache");
            std::env::set_var("DLANG_GIT_HOST", "file:///srv/mirror/");
            std::env::set_var("DLANG_CONFIG_TTL_SECS", "5");
        }
        let settings = Settings::from_env().unwrap();
        clear_env();

        assert_eq!(settings.cache_root, PathBuf::from("/tmp/dlang-cache"));
        assert_eq!(settings.git_host, "file:///srv/mirror");
        assert_eq!(settings.config_ttl, Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_invalid_ttl() {
        clear_env();
        // SAFETY: serialized with other env tests
        unsafe {
            std::env::set_var("DLANG_CONFIG_TTL_SECS", "soon");
        }
        let result = Settings::from_env();
        clear_env();
        assert!(matches!(result, Err(DepsError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_builder() {
        let settings = Settings::with_cache_root("/cache").git_host("file:///mirror/");
        assert_eq!(settings.cache_root, PathBuf::from("/cache"));
        assert_eq!(settings.git_host, "file:///mirror");
    }
}
