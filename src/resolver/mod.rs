//! Dependency resolution for dlang workspaces
//!
//! This module handles:
//! - Walking the manifest's git dependencies breadth-first
//! - Following local `path` dependencies to the git dependencies they declare
//! - Collapsing constraints to concrete versions and pinning them to commits
//! - Emitting the lock file in discovery order
//!
//! ```text
//! model.yaml ──► queue: (key, source, constraint, parent)
//!                  │
//!                  ├─ seen key?  ──► record parent in `dependents`
//!                  └─ new key    ──► materialize ─► hash ─► read its model.yaml
//!                                                              │
//!                                       enqueue its git deps ◄─┘
//! ```
//!
//! There is no range solving: `^1.2.0` pins `1.2.0`, and the first parent to
//! reach a package decides its version.

pub mod graph;

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

pub use graph::{DependencyGraph, DependencyNode};

use crate::config::{ConfigCache, Dependency, LockFile, Manifest};
use crate::error::Result;
use crate::hash;
use crate::path_utils::lexical_join;
use crate::settings::MANIFEST_FILE;
use crate::source::{GitSourceResolver, ResolveOptions};
use crate::version;

/// Parent label used for dependencies declared by a workspace without a name
pub const WORKSPACE_PARENT: &str = "(workspace)";

/// A git dependency as declared by some manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitDeclaration {
    /// `owner/repo`
    pub package_key: String,
    /// Specifier without the ref
    pub source: String,
    /// Declared ref or constraint
    pub constraint: String,
}

#[derive(Debug)]
struct PendingDependency {
    declaration: GitDeclaration,
    parent: String,
}

/// Builds a lock file from a workspace manifest
pub struct DependencyGraphBuilder<'a> {
    workspace_root: PathBuf,
    sources: &'a GitSourceResolver,
    configs: &'a ConfigCache,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(
        workspace_root: impl Into<PathBuf>,
        sources: &'a GitSourceResolver,
        configs: &'a ConfigCache,
    ) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            sources,
            configs,
        }
    }

    /// Resolve every transitive git dependency into a lock file
    ///
    /// A manifest without git dependencies yields an empty lock file without
    /// touching the network.
    ///
    /// # Errors
    ///
    /// Fails on an invalid declaration, on a source that cannot be resolved
    /// or materialized, or when a package ends up without a commit.
    pub fn resolve_dependencies(&self) -> Result<LockFile> {
        let graph = self.build_graph()?;
        let lock = graph.to_lock_file()?;
        info!(packages = lock.len(), "resolved dependencies");
        Ok(lock)
    }

    /// Breadth-first walk from the workspace manifest
    pub fn build_graph(&self) -> Result<DependencyGraph> {
        let manifest = self
            .configs
            .manifest(&self.workspace_root.join(MANIFEST_FILE))?;
        let mut graph = DependencyGraph::new();

        let root_parent = manifest.name().unwrap_or(WORKSPACE_PARENT).to_string();
        let declared = collect_git_dependencies(
            self.sources,
            self.configs,
            &self.workspace_root,
            &manifest,
        )?;
        if declared.is_empty() {
            debug!("workspace declares no git dependencies");
            return Ok(graph);
        }

        let mut queue: VecDeque<PendingDependency> = declared
            .into_iter()
            .map(|declaration| PendingDependency {
                declaration,
                parent: root_parent.clone(),
            })
            .collect();

        while let Some(pending) = queue.pop_front() {
            let PendingDependency {
                declaration,
                parent,
            } = pending;
            debug!(package = %declaration.package_key, parent = %parent, "visiting");

            if let Some(node) = graph.get_mut(&declaration.package_key) {
                if node.version_constraint != declaration.constraint {
                    warn!(
                        package = %declaration.package_key,
                        kept = %node.version_constraint,
                        ignored = %declaration.constraint,
                        "conflicting constraints; keeping the first one seen"
                    );
                }
                node.add_dependent(&parent);
                continue;
            }

            let (node, children) = self.visit(&declaration, &parent)?;
            graph.insert(node);
            queue.extend(children.into_iter().map(|child| PendingDependency {
                declaration: child,
                parent: declaration.package_key.clone(),
            }));
        }

        Ok(graph)
    }

    /// Materialize one package and read the dependencies it declares
    fn visit(
        &self,
        declaration: &GitDeclaration,
        parent: &str,
    ) -> Result<(DependencyNode, Vec<GitDeclaration>)> {
        let version = version::concrete_version(&declaration.constraint);
        let specifier = format!("{}@{}", declaration.source, version);
        let source = self.sources.resolve(&specifier, ResolveOptions::ONLINE)?;
        let integrity = hash::hash_directory(&source.root)?;

        let children = match self
            .configs
            .manifest_if_exists(&source.root.join(MANIFEST_FILE))?
        {
            Some(manifest) => {
                collect_git_dependencies(self.sources, self.configs, &source.root, &manifest)?
            }
            None => Vec::new(),
        };

        let node = DependencyNode {
            package_key: declaration.package_key.clone(),
            version_constraint: declaration.constraint.clone(),
            resolved_version: Some(version).filter(|v| !v.is_empty()),
            commit_hash: Some(source.commit.clone()),
            repo_url: source.descriptor.repo_url.clone(),
            integrity: Some(integrity),
            dependencies: children.iter().map(|c| c.package_key.clone()).collect(),
            dependents: vec![parent.to_string()],
        };
        Ok((node, children))
    }
}

/// Git dependencies declared by `manifest`, including those declared by the
/// local `path` dependencies it reaches
///
/// `dir` is the directory containing `manifest`. Each local directory is
/// read once, so `path` cycles terminate.
pub(crate) fn collect_git_dependencies(
    sources: &GitSourceResolver,
    configs: &ConfigCache,
    dir: &Path,
    manifest: &Manifest,
) -> Result<Vec<GitDeclaration>> {
    let mut visited = HashSet::new();
    visited.insert(canonical(dir));
    let mut out = Vec::new();
    collect_into(sources, configs, dir, manifest, &mut visited, &mut out)?;
    Ok(out)
}

fn collect_into(
    sources: &GitSourceResolver,
    configs: &ConfigCache,
    dir: &Path,
    manifest: &Manifest,
    visited: &mut HashSet<PathBuf>,
    out: &mut Vec<GitDeclaration>,
) -> Result<()> {
    for dependency in manifest.resolved_dependencies()? {
        match dependency {
            Dependency::Git {
                source, git_ref, ..
            } => {
                let descriptor = sources.parse(&source)?;
                out.push(GitDeclaration {
                    package_key: descriptor.package_key(),
                    source,
                    constraint: git_ref,
                });
            }
            Dependency::Local { alias, path } => {
                let local_dir = lexical_join(dir, &path);
                if !visited.insert(canonical(&local_dir)) {
                    continue;
                }
                let Some(local) = configs.manifest_if_exists(&local_dir.join(MANIFEST_FILE))?
                else {
                    debug!(alias = %alias, path = %local_dir.display(), "local dependency has no manifest");
                    continue;
                };
                collect_into(sources, configs, &local_dir, &local, visited, out)?;
            }
        }
    }
    Ok(())
}

fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::DepsError;
    use crate::settings::Settings;
    use crate::test_fixtures::{GitHost, create_workspace, write_file};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Env {
        host: GitHost,
        cache: TempDir,
        configs: ConfigCache,
    }

    impl Env {
        fn new() -> Self {
            Self {
                host: GitHost::new(),
                cache: TempDir::new().unwrap(),
                configs: ConfigCache::new(Duration::from_secs(60)),
            }
        }

        fn sources(&self) -> GitSourceResolver {
            GitSourceResolver::new(
                &Settings::with_cache_root(self.cache.path()).git_host(self.host.url()),
            )
        }
    }

    #[test]
    fn test_no_git_dependencies_is_empty_lock() {
        let env = Env::new();
        let workspace = create_workspace("model:\n  name: acme/shop\n");
        let sources = env.sources();

        let lock = DependencyGraphBuilder::new(workspace.path(), &sources, &env.configs)
            .resolve_dependencies()
            .unwrap();
        assert!(lock.is_empty());
        assert_eq!(lock.version, "1");
    }

    #[test]
    fn test_transitive_dependencies_in_discovery_order() {
        let env = Env::new();
        let patterns = env.host.repo("acme", "patterns");
        let patterns_sha = patterns.commit_file("index.dlang", "");
        patterns.tag("v2.1.0");

        let core = env.host.repo("acme", "core");
        core.commit_manifest("model:\n  name: acme/core\ndependencies:\n  acme/patterns: \"^2.1.0\"\n");
        let core_sha = core.commit_file("index.dlang", "");
        core.tag("v1.0.0");

        let workspace = create_workspace(
            "model:\n  name: acme/shop\ndependencies:\n  core:\n    source: acme/core\n    ref: v1.0.0\n",
        );
        let sources = env.sources();
        let builder = DependencyGraphBuilder::new(workspace.path(), &sources, &env.configs);

        let graph = builder.build_graph().unwrap();
        let core_node = graph.get("acme/core").unwrap();
        assert_eq!(core_node.dependents, ["acme/shop"]);
        assert_eq!(core_node.dependencies, ["acme/patterns"]);
        assert_eq!(
            graph.get("acme/patterns").unwrap().dependents,
            ["acme/core"]
        );

        let lock = builder.resolve_dependencies().unwrap();
        assert_eq!(
            lock.package_keys().collect::<Vec<_>>(),
            ["acme/core", "acme/patterns"]
        );
        assert_eq!(lock.get("acme/core").unwrap().commit, core_sha);
        assert_eq!(lock.get("acme/core").unwrap().version, "v1.0.0");
        let locked_patterns = lock.get("acme/patterns").unwrap();
        assert_eq!(locked_patterns.commit, patterns_sha);
        assert_eq!(locked_patterns.version, "2.1.0");
        assert!(
            locked_patterns
                .integrity
                .as_deref()
                .unwrap()
                .starts_with("blake3:")
        );
    }

    #[test]
    fn test_shared_dependency_records_every_dependent() {
        let env = Env::new();
        let base = env.host.repo("acme", "base");
        base.commit_file("index.dlang", "");
        base.tag("v1.0.0");
        for name in ["left", "right"] {
            let repo = env.host.repo("acme", name);
            repo.commit_manifest("dependencies:\n  acme/base: v1.0.0\n");
            repo.tag("v1.0.0");
        }

        let workspace = create_workspace(
            "dependencies:\n  acme/left: v1.0.0\n  acme/right: v1.0.0\n",
        );
        let sources = env.sources();
        let graph = DependencyGraphBuilder::new(workspace.path(), &sources, &env.configs)
            .build_graph()
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(
            graph.get("acme/base").unwrap().dependents,
            ["acme/left", "acme/right"]
        );
        assert_eq!(
            graph.get("acme/left").unwrap().dependents,
            [WORKSPACE_PARENT]
        );
    }

    #[test]
    fn test_manifest_cycle_terminates() {
        let env = Env::new();
        let a = env.host.repo("acme", "a");
        a.commit_manifest("dependencies:\n  acme/b: main\n");
        let b = env.host.repo("acme", "b");
        b.commit_manifest("dependencies:\n  acme/a: main\n");

        let workspace = create_workspace("dependencies:\n  acme/a: main\n");
        let sources = env.sources();
        let graph = DependencyGraphBuilder::new(workspace.path(), &sources, &env.configs)
            .build_graph()
            .unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(
            graph.get("acme/a").unwrap().dependents,
            [WORKSPACE_PARENT, "acme/b"]
        );
    }

    #[test]
    fn test_local_path_dependency_is_followed_not_locked() {
        let env = Env::new();
        let core = env.host.repo("acme", "core");
        core.commit_file("index.dlang", "");
        core.tag("v1.0.0");

        let workspace = create_workspace("dependencies:\n  lib:\n    path: ./libs/local\n");
        write_file(
            workspace.path(),
            "libs/local/model.yaml",
            "dependencies:\n  acme/core: v1.0.0\n  back:\n    path: ../..\n",
        );

        let sources = env.sources();
        let lock = DependencyGraphBuilder::new(workspace.path(), &sources, &env.configs)
            .resolve_dependencies()
            .unwrap();
        assert_eq!(lock.package_keys().collect::<Vec<_>>(), ["acme/core"]);
    }

    #[test]
    fn test_missing_ref_fails() {
        let env = Env::new();
        env.host.repo("acme", "core").commit_file("index.dlang", "");

        let workspace = create_workspace("dependencies:\n  acme/core: v9.9.9\n");
        let sources = env.sources();
        let err = DependencyGraphBuilder::new(workspace.path(), &sources, &env.configs)
            .resolve_dependencies()
            .unwrap_err();
        assert!(matches!(err, DepsError::SourceResolutionFailed { .. }));
    }

    #[test]
    fn test_invalid_declaration_fails() {
        let env = Env::new();
        let workspace = create_workspace("dependencies:\n  broken:\n    source: acme/core\n");
        let sources = env.sources();
        let err = DependencyGraphBuilder::new(workspace.path(), &sources, &env.configs)
            .resolve_dependencies()
            .unwrap_err();
        assert!(matches!(err, DepsError::InvalidDependency { .. }));
    }
}
