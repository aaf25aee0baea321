//! In-memory memoization of parsed manifests and lock files
//!
//! An entry is served while it is younger than the TTL and the file's mtime
//! is unchanged. Freshness is path + mtime only; content is never hashed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant, SystemTime};

use tracing::debug;

use super::{LockFile, Manifest};
use crate::error::Result;
use crate::settings::{DEFAULT_CONFIG_TTL, Settings};

struct Entry<T> {
    mtime: SystemTime,
    loaded_at: Instant,
    value: Arc<T>,
}

type Table<T> = Mutex<HashMap<PathBuf, Entry<T>>>;

/// Time-boxed cache of parsed configuration files
pub struct ConfigCache {
    ttl: Duration,
    manifests: Table<Manifest>,
    lock_files: Table<LockFile>,
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_TTL)
    }
}

fn guard<T>(table: &Table<T>) -> MutexGuard<'_, HashMap<PathBuf, Entry<T>>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl ConfigCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            manifests: Mutex::new(HashMap::new()),
            lock_files: Mutex::new(HashMap::new()),
        }
    }

    /// Process-wide instance, created on first use with the TTL from the environment
    pub fn shared() -> Arc<ConfigCache> {
        static SHARED: OnceLock<Arc<ConfigCache>> = OnceLock::new();
        SHARED
            .get_or_init(|| {
                let ttl = Settings::from_env().map_or(DEFAULT_CONFIG_TTL, |s| s.config_ttl);
                Arc::new(ConfigCache::new(ttl))
            })
            .clone()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop every entry
    pub fn reset(&self) {
        guard(&self.manifests).clear();
        guard(&self.lock_files).clear();
    }

    /// Drop entries for one path (manifest or lock file)
    pub fn invalidate(&self, path: &Path) {
        let removed_manifest = guard(&self.manifests).remove(path).is_some();
        let removed_lock = guard(&self.lock_files).remove(path).is_some();
        if removed_manifest || removed_lock {
            debug!(path = %path.display(), "invalidated config cache entry");
        }
    }

    /// Parsed manifest at `path`
    pub fn manifest(&self, path: &Path) -> Result<Arc<Manifest>> {
        if let Some(hit) = self.lookup(&self.manifests, path) {
            return Ok(hit);
        }
        let manifest = Arc::new(Manifest::load(path)?);
        self.store(&self.manifests, path, &manifest);
        Ok(manifest)
    }

    /// Manifest at `path`, or `None` when the file does not exist
    pub fn manifest_if_exists(&self, path: &Path) -> Result<Option<Arc<Manifest>>> {
        if path.is_file() {
            self.manifest(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Parsed lock file at `path`, or `None` when the file does not exist
    pub fn lock_file(&self, path: &Path) -> Result<Option<Arc<LockFile>>> {
        if let Some(hit) = self.lookup(&self.lock_files, path) {
            return Ok(Some(hit));
        }
        match LockFile::load(path)? {
            Some(lock) => {
                let lock = Arc::new(lock);
                self.store(&self.lock_files, path, &lock);
                Ok(Some(lock))
            }
            None => {
                guard(&self.lock_files).remove(path);
                Ok(None)
            }
        }
    }

    fn lookup<T>(&self, table: &Table<T>, path: &Path) -> Option<Arc<T>> {
        let mut entries = guard(table);
        let entry = entries.get(path)?;

        let fresh = entry.loaded_at.elapsed() < self.ttl && modified(path) == Some(entry.mtime);
        if fresh {
            return Some(entry.value.clone());
        }

        debug!(path = %path.display(), "config cache entry is stale");
        entries.remove(path);
        None
    }

    fn store<T>(&self, table: &Table<T>, path: &Path, value: &Arc<T>) {
        let Some(mtime) = modified(path) else {
            return;
        };
        guard(table).insert(
            path.to_path_buf(),
            Entry {
                mtime,
                loaded_at: Instant::now(),
                value: value.clone(),
            },
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn bump_mtime(path: &Path) {
        let later = SystemTime::now() + Duration::from_secs(10);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(later)
            .unwrap();
    }

    #[test]
    fn test_manifest_is_memoized() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.yaml");
        fs::write(&path, "model:\n  name: acme/a\n").unwrap();

        let cache = ConfigCache::new(Duration::from_secs(60));
        let first = cache.manifest(&path).unwrap();
        let second = cache.manifest(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_changed_mtime_reloads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.yaml");
        fs::write(&path, "model:\n  name: acme/a\n").unwrap();

        let cache = ConfigCache::new(Duration::from_secs(60));
        assert_eq!(cache.manifest(&path).unwrap().name(), Some("acme/a"));

        fs::write(&path, "model:\n  name: acme/b\n").unwrap();
        bump_mtime(&path);
        assert_eq!(cache.manifest(&path).unwrap().name(), Some("acme/b"));
    }

    #[test]
    fn test_same_mtime_serves_stale_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.yaml");
        fs::write(&path, "model:\n  name: acme/a\n").unwrap();
        let original = modified(&path).unwrap();

        let cache = ConfigCache::new(Duration::from_secs(60));
        cache.manifest(&path).unwrap();

        fs::write(&path, "model:\n  name: acme/b\n").unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(original)
            .unwrap();
        assert_eq!(cache.manifest(&path).unwrap().name(), Some("acme/a"));
    }

    #[test]
    fn test_expired_ttl_reloads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.yaml");
        fs::write(&path, "model:\n  name: acme/a\n").unwrap();

        let cache = ConfigCache::new(Duration::ZERO);
        let first = cache.manifest(&path).unwrap();
        let second = cache.manifest(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reset_and_invalidate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.yaml");
        fs::write(&path, "{}\n").unwrap();

        let cache = ConfigCache::new(Duration::from_secs(60));
        let first = cache.manifest(&path).unwrap();
        cache.invalidate(&path);
        let second = cache.manifest(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        cache.reset();
        let third = cache.manifest(&path).unwrap();
        assert!(!Arc::ptr_eq(&second, &third));
    }

    #[test]
    fn test_missing_lock_file() {
        let temp = TempDir::new().unwrap();
        let cache = ConfigCache::default();
        assert!(cache.lock_file(&temp.path().join("model.lock")).unwrap().is_none());
        assert!(
            cache
                .manifest_if_exists(&temp.path().join("model.yaml"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_lock_file_is_memoized() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.lock");
        LockFile::new().save(&path).unwrap();

        let cache = ConfigCache::default();
        let first = cache.lock_file(&path).unwrap().unwrap();
        let second = cache.lock_file(&path).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_shared_is_one_instance() {
        assert!(Arc::ptr_eq(&ConfigCache::shared(), &ConfigCache::shared()));
    }
}
