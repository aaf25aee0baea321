//! Git source resolution and materialization
//!
//! A specifier becomes a snapshot directory in three steps:
//!
//! 1. Parse it into a [`GitSourceDescriptor`].
//! 2. Pick a commit: the bound lock file's pin if there is one, otherwise
//!    resolve the ref against the remote.
//! 3. Reuse `<cache>/<platform>/<owner>/<repo>/<commit>` if it is populated,
//!    otherwise clone into a staging directory, check out the commit, strip
//!    `.git` and rename the result into place.
//!
//! With `allow_network: false` only step 3's cache lookup runs; anything
//! not already on disk is reported as not installed.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info};

use super::GitSourceDescriptor;
use crate::cache::{self, CacheStats};
use crate::config::{LockFile, LockedDependency};
use crate::error::{DepsError, Result, git as git_err, imports, source};
use crate::git;
use crate::settings::Settings;
use crate::version;

/// Options for [`GitSourceResolver::resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Allow listing, cloning and fetching remotes
    pub allow_network: bool,
}

impl ResolveOptions {
    pub const ONLINE: Self = Self {
        allow_network: true,
    };
    pub const OFFLINE: Self = Self {
        allow_network: false,
    };
}

/// A snapshot on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedSource {
    pub descriptor: GitSourceDescriptor,
    /// Full commit hash the snapshot was taken at
    pub commit: String,
    /// Snapshot root (`<cache>/<platform>/<owner>/<repo>/<commit>`)
    pub root: PathBuf,
}

impl MaterializedSource {
    /// Root joined with the descriptor's entry point, if any
    pub fn entry_path(&self) -> PathBuf {
        match &self.descriptor.entry_point {
            Some(entry) => self.root.join(entry),
            None => self.root.clone(),
        }
    }
}

/// Resolves specifiers to cached snapshots
pub struct GitSourceResolver {
    cache_root: PathBuf,
    default_host: String,
    lock: RwLock<Option<LockFile>>,
}

impl GitSourceResolver {
    pub fn new(settings: &Settings) -> Self {
        Self {
            cache_root: settings.cache_root.clone(),
            default_host: settings.git_host.clone(),
            lock: RwLock::new(None),
        }
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn default_host(&self) -> &str {
        &self.default_host
    }

    /// Parse a specifier against this resolver's default host
    pub fn parse(&self, specifier: &str) -> Result<GitSourceDescriptor> {
        GitSourceDescriptor::parse(specifier, &self.default_host)
    }

    /// Bind (or with `None`, unbind) the lock file whose pins take precedence
    pub fn bind_lock_file(&self, lock: Option<LockFile>) {
        *self.lock.write().unwrap_or_else(PoisonError::into_inner) = lock;
    }

    /// Commit the bound lock file pins for `package_key`
    pub fn pinned_commit(&self, package_key: &str) -> Option<String> {
        self.lock
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()?
            .get(package_key)
            .map(|locked| locked.commit.clone())
    }

    /// Snapshot directory for `descriptor` at `commit`
    pub fn cache_path(&self, descriptor: &GitSourceDescriptor, commit: &str) -> PathBuf {
        cache::snapshot_dir(
            &self.cache_root,
            &descriptor.platform,
            &descriptor.owner,
            &descriptor.repo,
            commit,
        )
    }

    /// Snapshot directory a lock file entry points at
    ///
    /// The directory may not exist; check with [`cache::is_populated`].
    pub fn locked_snapshot(&self, locked: &LockedDependency) -> Result<PathBuf> {
        let descriptor = self.parse(&locked.resolved)?;
        Ok(self.cache_path(&descriptor, &locked.commit))
    }

    /// Resolve a specifier to a snapshot on disk
    ///
    /// Git failures come back as `SourceResolutionFailed` naming `specifier`.
    pub fn resolve(&self, specifier: &str, options: ResolveOptions) -> Result<MaterializedSource> {
        let descriptor = self.parse(specifier)?;
        let package_key = descriptor.package_key();
        let pinned = self.pinned_commit(&package_key);

        if !options.allow_network {
            return self.resolve_offline(descriptor, pinned);
        }

        let materialize = || -> Result<MaterializedSource> {
            let commit = match pinned {
                Some(commit) => {
                    debug!(package = %package_key, commit = %commit, "using pinned commit");
                    commit
                }
                None => self.resolve_commit(&descriptor)?,
            };
            let root = self.materialize(&descriptor, &commit)?;
            Ok(MaterializedSource {
                descriptor: descriptor.clone(),
                commit,
                root,
            })
        };

        materialize().map_err(|e| wrap(specifier, e))
    }

    fn resolve_offline(
        &self,
        descriptor: GitSourceDescriptor,
        pinned: Option<String>,
    ) -> Result<MaterializedSource> {
        let package_key = descriptor.package_key();
        let commit = pinned
            .or_else(|| {
                descriptor
                    .git_ref
                    .clone()
                    .filter(|r| version::is_full_commit_hash(r))
            })
            .ok_or_else(|| imports::not_installed(&package_key))?;

        let root = self.cache_path(&descriptor, &commit);
        if !cache::is_populated(&root) {
            debug!(package = %package_key, path = %root.display(), "snapshot missing offline");
            return Err(imports::not_installed(package_key));
        }

        Ok(MaterializedSource {
            descriptor,
            commit,
            root,
        })
    }

    /// Resolve the descriptor's ref to a full commit hash
    ///
    /// Full hashes pass through. Branches and tags come from the remote's ref
    /// listing, retrying version-like tags with the `v` prefix toggled.
    /// Abbreviated hashes need a full clone.
    pub fn resolve_commit(&self, descriptor: &GitSourceDescriptor) -> Result<String> {
        let git_ref = descriptor.git_ref.as_deref().unwrap_or("HEAD");
        if version::is_full_commit_hash(git_ref) {
            return Ok(git_ref.to_ascii_lowercase());
        }

        let refs = git::list_remote_refs(&descriptor.repo_url)?;
        if let Some(commit) = git::find_remote_ref(&refs, git_ref) {
            debug!(git_ref, commit = %commit, "resolved ref");
            return Ok(commit);
        }

        if let Some(alternate) = version::alternate_tag(git_ref) {
            if let Some(commit) = git::find_remote_ref(&refs, &alternate) {
                debug!(git_ref, alternate = %alternate, commit = %commit, "resolved alternate tag");
                return Ok(commit);
            }
        }

        if version::is_commit_hash(git_ref) {
            return resolve_abbreviated(descriptor, git_ref);
        }

        Err(git_err::ref_resolve_failed(
            git_ref,
            format!("not found in {}", descriptor.repo_url),
        ))
    }

    /// Make sure a snapshot of `commit` exists and return its path
    fn materialize(&self, descriptor: &GitSourceDescriptor, commit: &str) -> Result<PathBuf> {
        let target = self.cache_path(descriptor, commit);
        if cache::is_populated(&target) {
            debug!(path = %target.display(), "cache hit");
            return Ok(target);
        }

        info!(package = %descriptor.package_key(), commit, "fetching");
        let staging = cache::staging_dir(&target)?;
        let snapshot = staging.path().join("snapshot");

        let repo = git::clone(&descriptor.repo_url, &snapshot, true)?;
        git::fetch_commit(&repo, commit)?;
        git::checkout_commit(&repo, commit)?;
        drop(repo);
        git::strip_git_metadata(&snapshot)?;

        cache::publish(&snapshot, &target)?;
        Ok(target)
    }

    /// Tags the remote advertises, sorted by version (ascending)
    pub fn list_remote_tags(&self, specifier: &str) -> Result<Vec<String>> {
        let descriptor = self.parse(specifier)?;
        let refs = git::list_remote_refs(&descriptor.repo_url).map_err(|e| wrap(specifier, e))?;
        let mut tags = git::remote_tags(&refs);
        version::sort_versions(&mut tags);
        Ok(tags)
    }

    /// Size and entry counts of the snapshot cache
    pub fn cache_stats(&self) -> Result<CacheStats> {
        cache::cache_stats(&self.cache_root)
    }

    /// Remove every snapshot
    pub fn clear_cache(&self) -> Result<()> {
        info!(path = %self.cache_root.display(), "clearing cache");
        cache::clear_cache(&self.cache_root)
    }
}

fn resolve_abbreviated(descriptor: &GitSourceDescriptor, short: &str) -> Result<String> {
    debug!(short, url = %descriptor.repo_url, "resolving abbreviated hash from a full clone");
    let scratch = tempfile::TempDir::new()
        .map_err(|e| git_err::operation_failed(format!("Failed to create temp dir: {e}")))?;
    let repo = git::clone(&descriptor.repo_url, &scratch.path().join("repo"), false)?;
    git::resolve_ref(&repo, Some(short))
}

/// Wrap git failures so they name the specifier; actionable errors pass through
fn wrap(specifier: &str, err: DepsError) -> DepsError {
    match err {
        DepsError::GitOperationFailed { .. }
        | DepsError::GitCloneFailed { .. }
        | DepsError::GitRefResolveFailed { .. }
        | DepsError::GitCheckoutFailed { .. }
        | DepsError::GitFetchFailed { .. }
        | DepsError::CacheOperationFailed { .. }
        | DepsError::IoError { .. } => source::resolution_failed(specifier, &err),
        other => other,
    }
}
