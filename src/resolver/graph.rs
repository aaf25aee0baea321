//! Dependency graph produced by one resolution run
//!
//! ```text
//! IndexMap<package_key, DependencyNode>   (BFS discovery order)
//!              ↓
//!   dependencies ──► keys this package declares
//!   dependents   ──► keys (or the workspace) that require it
//! ```
//!
//! The graph lives only for the duration of a run; [`DependencyGraph::to_lock_file`]
//! turns it into the persisted form.

use indexmap::IndexMap;

use crate::config::{LockFile, LockedDependency};
use crate::error::{Result, deps};

/// One distinct package in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub package_key: String,
    /// Constraint as declared by the parent that discovered this node first
    pub version_constraint: String,
    pub resolved_version: Option<String>,
    pub commit_hash: Option<String>,
    pub repo_url: String,
    pub integrity: Option<String>,
    /// Package keys this package declares
    pub dependencies: Vec<String>,
    /// Packages (or the workspace) requiring this one, in discovery order
    pub dependents: Vec<String>,
}

impl DependencyNode {
    /// Record another parent; repeated parents are kept once
    pub fn add_dependent(&mut self, parent: &str) {
        if !self.dependents.iter().any(|d| d == parent) {
            self.dependents.push(parent.to_string());
        }
    }
}

/// All nodes of one run, keyed by package key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: IndexMap<String, DependencyNode>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, package_key: &str) -> Option<&DependencyNode> {
        self.nodes.get(package_key)
    }

    pub fn get_mut(&mut self, package_key: &str) -> Option<&mut DependencyNode> {
        self.nodes.get_mut(package_key)
    }

    /// Insert a node; the first insertion for a key wins
    pub fn insert(&mut self, node: DependencyNode) {
        self.nodes.entry(node.package_key.clone()).or_insert(node);
    }

    /// Nodes in discovery order
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Assemble the lock file in discovery order
    ///
    /// A node without a commit cannot be pinned and fails the run. A node
    /// with a commit but no version records the commit as its version.
    pub fn to_lock_file(&self) -> Result<LockFile> {
        let mut lock = LockFile::new();
        for node in self.nodes.values() {
            let Some(commit) = node.commit_hash.clone() else {
                return Err(deps::unresolved_version(&node.package_key));
            };
            let version = node
                .resolved_version
                .clone()
                .unwrap_or_else(|| commit.clone());

            lock.insert(
                node.package_key.clone(),
                LockedDependency {
                    version,
                    resolved: node.repo_url.clone(),
                    commit,
                    integrity: node.integrity.clone(),
                },
            );
        }
        Ok(lock)
    }
}
