//! Lock file (model.lock) data structures
//!
//! The lock file pins every transitive git dependency to an exact commit.
//! Hand edits are tolerated: an entry missing `version`, `resolved` or
//! `commit` is dropped on load instead of failing the whole file.

use std::fs;
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, config, fs as fs_err};

/// Only lock file format this crate reads and writes
pub const LOCK_FILE_VERSION: &str = "1";

/// Lock file structure (model.lock)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockFile {
    pub version: String,

    /// Package key (`owner/repo`) → pin, in discovery order
    pub dependencies: IndexMap<String, LockedDependency>,
}

/// One pinned dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedDependency {
    /// Concrete version token the constraint collapsed to
    pub version: String,

    /// Repository URL
    pub resolved: String,

    /// Full commit hash
    pub commit: String,

    /// BLAKE3 hash of the snapshot contents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}

#[derive(Deserialize)]
struct RawLockFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: IndexMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawLockedDependency {
    version: Option<String>,
    resolved: Option<String>,
    commit: Option<String>,
    integrity: Option<String>,
}

impl RawLockedDependency {
    fn complete(self) -> Option<LockedDependency> {
        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Some(LockedDependency {
            version: non_empty(self.version)?,
            resolved: non_empty(self.resolved)?,
            commit: non_empty(self.commit)?,
            integrity: self.integrity,
        })
    }
}

impl Default for LockFile {
    fn default() -> Self {
        Self::new()
    }
}

impl LockFile {
    /// Empty lock file
    pub fn new() -> Self {
        Self {
            version: LOCK_FILE_VERSION.to_string(),
            dependencies: IndexMap::new(),
        }
    }

    /// Parse lock file JSON, dropping incomplete entries
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawLockFile = serde_json::from_str(json)?;

        let version = raw.version.unwrap_or_else(|| LOCK_FILE_VERSION.to_string());
        if version != LOCK_FILE_VERSION {
            return Err(config::invalid(format!(
                "unsupported lock file version '{version}' (expected '{LOCK_FILE_VERSION}')"
            )));
        }

        let mut dependencies = IndexMap::with_capacity(raw.dependencies.len());
        for (key, value) in raw.dependencies {
            match serde_json::from_value::<RawLockedDependency>(value)
                .ok()
                .and_then(RawLockedDependency::complete)
            {
                Some(locked) => {
                    dependencies.insert(key, locked);
                }
                None => warn!(package = %key, "dropping incomplete lock file entry"),
            }
        }

        Ok(Self {
            version,
            dependencies,
        })
    }

    /// Serialize as pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Read a lock file; `None` when it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .map_err(|e| config::read_failed(path.display().to_string(), e.to_string()))?;
        Self::from_json(&content)
            .map(Some)
            .map_err(|e| match e {
                crate::error::DepsError::ConfigParseFailed { reason, .. } => {
                    config::parse_failed(path.display().to_string(), reason)
                }
                other => other,
            })
    }

    /// Write the lock file atomically (temp file + rename in the same directory)
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let write_failed = |e: std::io::Error| fs_err::write_failed(path.display().to_string(), e.to_string());

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
        temp.write_all(json.as_bytes()).map_err(write_failed)?;
        temp.persist(path).map_err(|e| write_failed(e.error))?;

        debug!(path = %path.display(), entries = self.dependencies.len(), "wrote lock file");
        Ok(())
    }

    pub fn get(&self, package_key: &str) -> Option<&LockedDependency> {
        self.dependencies.get(package_key)
    }

    pub fn contains(&self, package_key: &str) -> bool {
        self.dependencies.contains_key(package_key)
    }

    pub fn insert(&mut self, package_key: impl Into<String>, locked: LockedDependency) {
        self.dependencies.insert(package_key.into(), locked);
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Package keys in lock order
    pub fn package_keys(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }
}
