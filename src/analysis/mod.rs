//! Read-only analysis over a lock file
//!
//! Edges come from the manifests inside cached snapshots, so nothing here
//! touches the network. A package whose snapshot is missing simply has no
//! outgoing edges.
//!
//! ```text
//! model.lock ──► locked_snapshot ──► <snapshot>/model.yaml ──► declared keys
//! ```

mod policy;
mod tree;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

pub use policy::{VersionPolicy, VersionSelection, resolve_version_policy};
pub use tree::{DependencyTree, FormatOptions, TreeNode, format_dependency_tree};

use crate::cache;
use crate::config::{ConfigCache, LockFile, LockedDependency, Manifest};
use crate::error::Result;
use crate::resolver::{WORKSPACE_PARENT, collect_git_dependencies};
use crate::settings::MANIFEST_FILE;
use crate::source::GitSourceResolver;

/// Manifest inside the snapshot a lock entry points at, if installed
pub(crate) fn locked_manifest(
    sources: &GitSourceResolver,
    configs: &ConfigCache,
    locked: &LockedDependency,
) -> Result<Option<Arc<Manifest>>> {
    let snapshot = sources.locked_snapshot(locked)?;
    if !cache::is_populated(&snapshot) {
        debug!(path = %snapshot.display(), "snapshot not installed");
        return Ok(None);
    }
    configs.manifest_if_exists(&snapshot.join(MANIFEST_FILE))
}

/// Analysis entry point bound to a cache and config cache
pub struct DependencyAnalyzer<'a> {
    sources: &'a GitSourceResolver,
    configs: &'a ConfigCache,
}

impl<'a> DependencyAnalyzer<'a> {
    pub fn new(sources: &'a GitSourceResolver, configs: &'a ConfigCache) -> Self {
        Self { sources, configs }
    }

    /// Package keys declared by the workspace manifest, and its display label
    fn root_edges(&self, workspace_root: &Path) -> Result<(String, Vec<String>)> {
        let Some(manifest) = self
            .configs
            .manifest_if_exists(&workspace_root.join(MANIFEST_FILE))?
        else {
            return Ok((WORKSPACE_PARENT.to_string(), Vec::new()));
        };
        let label = manifest.name().unwrap_or(WORKSPACE_PARENT).to_string();
        let keys = self.declared_keys(workspace_root, &manifest)?;
        Ok((label, keys))
    }

    fn declared_keys(&self, dir: &Path, manifest: &Manifest) -> Result<Vec<String>> {
        let mut keys: Vec<String> = Vec::new();
        for declaration in collect_git_dependencies(self.sources, self.configs, dir, manifest)? {
            if !keys.contains(&declaration.package_key) {
                keys.push(declaration.package_key);
            }
        }
        Ok(keys)
    }

    /// Declared package keys of every locked package, in lock order
    pub fn locked_edges(&self, lock: &LockFile) -> Result<IndexMap<String, Vec<String>>> {
        let mut edges = IndexMap::with_capacity(lock.len());
        for (package_key, locked) in &lock.dependencies {
            let declared = match locked_manifest(self.sources, self.configs, locked)? {
                Some(manifest) => {
                    let snapshot = self.sources.locked_snapshot(locked)?;
                    self.declared_keys(&snapshot, &manifest)?
                }
                None => Vec::new(),
            };
            edges.insert(package_key.clone(), declared);
        }
        Ok(edges)
    }

    /// Tree rooted at the workspace, following locked edges
    pub fn build_dependency_tree(
        &self,
        lock: &LockFile,
        workspace_root: &Path,
    ) -> Result<DependencyTree> {
        let (name, roots) = self.root_edges(workspace_root)?;
        let edges = self.locked_edges(lock)?;
        Ok(tree::build(name, &roots, lock, &edges))
    }

    /// Every package (or the workspace) that declares `target`
    ///
    /// The workspace comes first, then packages in lock order.
    pub fn find_reverse_dependencies(
        &self,
        target: &str,
        lock: &LockFile,
        workspace_root: &Path,
    ) -> Result<Vec<String>> {
        let mut dependents = Vec::new();
        let (label, roots) = self.root_edges(workspace_root)?;
        if roots.iter().any(|k| k == target) {
            dependents.push(label);
        }
        for (package_key, declared) in self.locked_edges(lock)? {
            if declared.iter().any(|k| k == target) {
                dependents.push(package_key);
            }
        }
        Ok(dependents)
    }

    /// Cycles among locked packages, each closed by repeating its first key
    ///
    /// Depth-first with an explicit stack, starting from each package in lock
    /// order. A cycle reachable from several starting points is reported once.
    pub fn detect_circular_dependencies(&self, lock: &LockFile) -> Result<Vec<Vec<String>>> {
        let edges = self.locked_edges(lock)?;
        Ok(find_cycles(&edges))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

fn find_cycles(edges: &IndexMap<String, Vec<String>>) -> Vec<Vec<String>> {
    let mut marks: HashMap<&str, Mark> = edges
        .keys()
        .map(|k| (k.as_str(), Mark::Unvisited))
        .collect();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut cycles = Vec::new();

    for start in edges.keys() {
        if marks.get(start.as_str()) != Some(&Mark::Unvisited) {
            continue;
        }
        marks.insert(start.as_str(), Mark::OnStack);
        let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];

        while let Some(&(node, next)) = stack.last() {
            let children = edges.get(node).map_or(&[][..], Vec::as_slice);
            let Some(child) = children.get(next) else {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks.get(child.as_str()).copied() {
                Some(Mark::Unvisited) => {
                    marks.insert(child.as_str(), Mark::OnStack);
                    stack.push((child.as_str(), 0));
                }
                Some(Mark::OnStack) => {
                    let Some(pos) = stack.iter().position(|(n, _)| *n == child.as_str()) else {
                        continue;
                    };
                    let members: Vec<String> =
                        stack[pos..].iter().map(|(n, _)| (*n).to_string()).collect();
                    if seen.insert(canonical_rotation(&members)) {
                        let mut cycle = members;
                        cycle.push(child.clone());
                        debug!(cycle = %cycle.join(" -> "), "circular dependency");
                        cycles.push(cycle);
                    }
                }
                // Done, or not a locked package
                _ => {}
            }
        }
    }
    cycles
}

/// Rotation starting at the smallest key, so `a→b→a` and `b→a→b` compare equal
fn canonical_rotation(members: &[String]) -> Vec<String> {
    let start = members
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(i, _)| i);
    members[start..]
        .iter()
        .chain(&members[..start])
        .cloned()
        .collect()
}
