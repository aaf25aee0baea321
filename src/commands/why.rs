//! Why command implementation
//!
//! Lists the packages (and the workspace itself) that declare a dependency.

use std::path::PathBuf;

use console::style;

use dlang_deps::analysis::DependencyAnalyzer;
use dlang_deps::config::Dependency;
use dlang_deps::error::Result;
use dlang_deps::workspace::WorkspaceResolver;

use super::open_workspace;
use crate::cli::WhyArgs;

/// Run why command
pub fn run(workspace: Option<PathBuf>, args: WhyArgs) -> Result<()> {
    let resolver = open_workspace(workspace)?;
    let lock = resolver.ensure_lock_file()?;
    let root = resolver.workspace_root()?;
    let package_key = package_key_for(&resolver, &args.package)?;

    let analyzer = DependencyAnalyzer::new(resolver.sources(), resolver.configs());
    let dependents = analyzer.find_reverse_dependencies(&package_key, &lock, &root)?;

    if dependents.is_empty() {
        println!("Nothing depends on {}.", style(&package_key).cyan());
        return Ok(());
    }

    println!("{} is required by:", style(&package_key).cyan());
    for dependent in &dependents {
        println!("  {dependent}");
    }
    Ok(())
}

/// Package key for a manifest alias; anything else is taken as a key
fn package_key_for(resolver: &WorkspaceResolver, name: &str) -> Result<String> {
    match resolver.manifest()?.dependency(name)? {
        Some(Dependency::Git { source, .. }) => Ok(resolver.sources().parse(&source)?.package_key()),
        _ => Ok(name.to_string()),
    }
}
