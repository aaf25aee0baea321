//! Tree command implementation

use std::path::PathBuf;

use dlang_deps::analysis::{DependencyAnalyzer, FormatOptions, format_dependency_tree};
use dlang_deps::error::Result;

use super::open_workspace;
use crate::cli::TreeArgs;

/// Run tree command
pub fn run(workspace: Option<PathBuf>, args: TreeArgs) -> Result<()> {
    let resolver = open_workspace(workspace)?;
    let lock = resolver.ensure_lock_file()?;
    let root = resolver.workspace_root()?;

    let analyzer = DependencyAnalyzer::new(resolver.sources(), resolver.configs());
    let tree = analyzer.build_dependency_tree(&lock, &root)?;
    print!(
        "{}",
        format_dependency_tree(
            &tree,
            FormatOptions {
                show_commits: args.commits,
            }
        )
    );
    Ok(())
}
