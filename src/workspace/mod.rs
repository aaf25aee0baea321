//! Workspace management for dlang
//!
//! This module handles:
//! - Workspace root discovery
//! - Loading, generating and regenerating the lock file
//! - Mapping dependency aliases in import paths to git specifiers
//!
//! ## Workspace Structure
//!
//! ```text
//! <root>/
//! ├── model.yaml   # Manifest: identity, paths, dependencies, governance
//! ├── model.lock   # Resolved dependencies (generated)
//! └── **/*.dlang   # Sources
//! ```
//!
//! One [`WorkspaceResolver`] serves one workspace. Its state sits behind a
//! single mutex that is held for the whole of initialization and lock file
//! generation, so concurrent callers observe exactly one root walk and at most
//! one resolution run.

pub mod detection;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

pub use detection::find_workspace_root;

use crate::config::{ConfigCache, Dependency, LockFile, Manifest};
use crate::error::{DepsError, Result};
use crate::path_utils::lexical_join;
use crate::resolver::DependencyGraphBuilder;
use crate::settings::{LOCK_FILE, MANIFEST_FILE, Settings};
use crate::source::GitSourceResolver;
use crate::version;

/// Where an aliased import path points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyImport {
    /// Git specifier with the remaining subpath folded in (`acme/core/sub@v1.0.0`)
    Git { specifier: String },
    /// Directory of a `path` dependency, remaining subpath joined
    Local { path: PathBuf },
}

#[derive(Debug, Default)]
struct WorkspaceState {
    root: Option<PathBuf>,
    lock: Option<Arc<LockFile>>,
}

impl WorkspaceState {
    fn root(&self) -> Result<PathBuf> {
        self.root.clone().ok_or(DepsError::WorkspaceNotInitialized)
    }
}

/// Entry point for everything scoped to one workspace
pub struct WorkspaceResolver {
    settings: Settings,
    sources: GitSourceResolver,
    configs: Arc<ConfigCache>,
    state: Mutex<WorkspaceState>,
}

impl WorkspaceResolver {
    /// Resolver using the process-wide config cache
    pub fn new(settings: Settings) -> Self {
        Self::with_config_cache(settings, ConfigCache::shared())
    }

    pub fn with_config_cache(settings: Settings, configs: Arc<ConfigCache>) -> Self {
        Self {
            sources: GitSourceResolver::new(&settings),
            settings,
            configs,
            state: Mutex::new(WorkspaceState::default()),
        }
    }

    /// Resolver configured from `DLANG_*` environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Settings::from_env()?))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sources(&self) -> &GitSourceResolver {
        &self.sources
    }

    pub fn configs(&self) -> &ConfigCache {
        &self.configs
    }

    fn state(&self) -> MutexGuard<'_, WorkspaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Discover the workspace root above `start` and load its lock file
    ///
    /// Only the first call walks the filesystem; later calls return the
    /// same root.
    ///
    /// # Errors
    ///
    /// `WorkspaceNotFound` when no ancestor of `start` holds a manifest.
    pub fn initialize(&self, start: &Path) -> Result<PathBuf> {
        let mut state = self.state();
        if let Some(root) = &state.root {
            return Ok(root.clone());
        }

        let root = find_workspace_root(start)?;
        let lock = self.configs.lock_file(&root.join(LOCK_FILE))?;
        info!(root = %root.display(), locked = lock.as_ref().map_or(0, |l| l.len()), "initialized workspace");

        state.root = Some(root.clone());
        self.bind(&mut state, lock);
        Ok(root)
    }

    /// Absolute workspace root
    pub fn workspace_root(&self) -> Result<PathBuf> {
        self.state().root()
    }

    pub fn manifest_path(&self) -> Result<PathBuf> {
        Ok(self.workspace_root()?.join(MANIFEST_FILE))
    }

    pub fn lock_path(&self) -> Result<PathBuf> {
        Ok(self.workspace_root()?.join(LOCK_FILE))
    }

    /// The workspace manifest
    pub fn manifest(&self) -> Result<Arc<Manifest>> {
        self.configs.manifest(&self.manifest_path()?)
    }

    /// Lock file on disk, if any; never triggers resolution
    pub fn lock_file(&self) -> Result<Option<Arc<LockFile>>> {
        let mut state = self.state();
        let root = state.root()?;
        let lock = self.configs.lock_file(&root.join(LOCK_FILE))?;
        self.bind(&mut state, lock.clone());
        Ok(lock)
    }

    /// Lock file on disk, generating and saving it first if absent
    ///
    /// # Errors
    ///
    /// Any failure of the resolution run; nothing is written in that case.
    pub fn ensure_lock_file(&self) -> Result<Arc<LockFile>> {
        let mut state = self.state();
        let root = state.root()?;

        if let Some(lock) = self.configs.lock_file(&root.join(LOCK_FILE))? {
            self.bind(&mut state, Some(lock.clone()));
            return Ok(lock);
        }

        info!("no lock file; resolving dependencies");
        self.bind(&mut state, None);
        self.generate(&mut state, &root)
    }

    /// Re-resolve every ref, ignoring current pins, and overwrite the lock file
    ///
    /// On failure the previous pins stay bound and the file is untouched.
    pub fn regenerate_lock_file(&self) -> Result<Arc<LockFile>> {
        let mut state = self.state();
        let root = state.root()?;
        let previous = state.lock.take();

        info!("regenerating lock file");
        self.sources.bind_lock_file(None);
        self.generate(&mut state, &root).inspect_err(|_| {
            debug!("regeneration failed; restoring previous pins");
            self.bind(&mut state, previous);
        })
    }

    fn generate(&self, state: &mut WorkspaceState, root: &Path) -> Result<Arc<LockFile>> {
        let lock = DependencyGraphBuilder::new(root, &self.sources, &self.configs)
            .resolve_dependencies()?;

        let path = root.join(LOCK_FILE);
        lock.save(&path)?;
        self.configs.invalidate(&path);

        let lock = self
            .configs
            .lock_file(&path)?
            .unwrap_or_else(|| Arc::new(lock));
        self.bind(state, Some(lock.clone()));
        Ok(lock)
    }

    /// Make `lock` the pins the source resolver uses
    fn bind(&self, state: &mut WorkspaceState, lock: Option<Arc<LockFile>>) {
        let unchanged = match (&state.lock, &lock) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        self.sources
            .bind_lock_file(lock.as_deref().cloned());
        state.lock = lock;
    }

    /// Map an import path whose first segments name a dependency
    ///
    /// `alias_path` is matched against every dependency alias and, for git
    /// dependencies, their package key; the longest match wins. Git
    /// dependencies come back as `source[/rest]@version`, `path` dependencies
    /// as a directory. `None` when nothing matches.
    pub fn resolve_dependency_import(&self, alias_path: &str) -> Result<Option<DependencyImport>> {
        let root = self.workspace_root()?;
        let manifest = self.manifest()?;

        let mut best: Option<(usize, Dependency)> = None;
        for dependency in manifest.resolved_dependencies()? {
            let mut keys = vec![dependency.alias().to_string()];
            if let Dependency::Git { source, .. } = &dependency {
                keys.push(self.sources.parse(source)?.package_key());
            }
            let matched = keys
                .iter()
                .filter(|key| prefix_matches(alias_path, key))
                .map(String::len)
                .max();
            if let Some(len) = matched {
                if best.as_ref().is_none_or(|(best_len, _)| len > *best_len) {
                    best = Some((len, dependency));
                }
            }
        }

        let Some((len, dependency)) = best else {
            return Ok(None);
        };
        let rest = alias_path[len..].trim_start_matches('/');

        let import = match dependency {
            Dependency::Git {
                source, git_ref, ..
            } => {
                let mut specifier = source;
                if !rest.is_empty() {
                    specifier.push('/');
                    specifier.push_str(rest);
                }
                specifier.push('@');
                specifier.push_str(&version::concrete_version(&git_ref));
                DependencyImport::Git { specifier }
            }
            Dependency::Local { path, .. } => {
                let dir = lexical_join(&root, &path);
                DependencyImport::Local {
                    path: if rest.is_empty() { dir } else { lexical_join(&dir, rest) },
                }
            }
        };
        debug!(alias_path, ?import, "mapped dependency import");
        Ok(Some(import))
    }
}

fn prefix_matches(path: &str, key: &str) -> bool {
    path == key || path.strip_prefix(key).is_some_and(|rest| rest.starts_with('/'))
}
