//! Dependency tree construction and rendering
//!
//! ```text
//! acme/shop
//! ├── acme/core@v1.0.0 (3f2a9c1)
//! │   └── acme/patterns@2.1.0 (9b0c2d4)
//! └── acme/loop@main (circular)
//! ```

use indexmap::IndexMap;

use crate::config::LockFile;

const SHORT_COMMIT: usize = 7;

/// Workspace-rooted view of the locked graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyTree {
    /// Workspace name, or a placeholder when the manifest has none
    pub name: String,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub package_key: String,
    pub version: Option<String>,
    pub commit: Option<String>,
    pub children: Vec<TreeNode>,
    /// Already an ancestor on this branch; children are not expanded
    pub cyclic: bool,
    /// Declared but absent from the lock file
    pub missing: bool,
}

/// Rendering switches for [`format_dependency_tree`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Append abbreviated commit hashes
    pub show_commits: bool,
}

pub(super) fn build(
    name: String,
    roots: &[String],
    lock: &LockFile,
    edges: &IndexMap<String, Vec<String>>,
) -> DependencyTree {
    let mut ancestors = Vec::new();
    let children = roots
        .iter()
        .map(|key| build_node(key, lock, edges, &mut ancestors))
        .collect();
    DependencyTree { name, children }
}

fn build_node(
    package_key: &str,
    lock: &LockFile,
    edges: &IndexMap<String, Vec<String>>,
    ancestors: &mut Vec<String>,
) -> TreeNode {
    let locked = lock.get(package_key);
    let mut node = TreeNode {
        package_key: package_key.to_string(),
        version: locked.map(|l| l.version.clone()),
        commit: locked.map(|l| l.commit.clone()),
        children: Vec::new(),
        cyclic: ancestors.iter().any(|a| a == package_key),
        missing: locked.is_none(),
    };
    if node.cyclic || node.missing {
        return node;
    }

    ancestors.push(package_key.to_string());
    if let Some(declared) = edges.get(package_key) {
        node.children = declared
            .iter()
            .map(|child| build_node(child, lock, edges, ancestors))
            .collect();
    }
    ancestors.pop();
    node
}

/// Render a tree with box-drawing branch glyphs, one package per line
pub fn format_dependency_tree(tree: &DependencyTree, options: FormatOptions) -> String {
    let mut out = String::new();
    out.push_str(&tree.name);
    out.push('\n');
    write_children(&mut out, &tree.children, "", options);
    out
}

fn write_children(out: &mut String, nodes: &[TreeNode], prefix: &str, options: FormatOptions) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&label(node, options));
        out.push('\n');

        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        write_children(out, &node.children, &child_prefix, options);
    }
}

fn label(node: &TreeNode, options: FormatOptions) -> String {
    let mut label = node.package_key.clone();
    if let Some(version) = &node.version {
        label.push('@');
        label.push_str(version);
    }
    if options.show_commits {
        if let Some(commit) = &node.commit {
            label.push_str(&format!(
                " ({})",
                commit.get(..SHORT_COMMIT).unwrap_or(commit)
            ));
        }
    }
    if node.cyclic {
        label.push_str(" (circular)");
    }
    if node.missing {
        label.push_str(" (not installed)");
    }
    label
}
