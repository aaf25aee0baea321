//! Cycles command implementation

use std::path::PathBuf;

use console::style;

use dlang_deps::analysis::DependencyAnalyzer;
use dlang_deps::error::Result;

use super::open_workspace;

/// Run cycles command
pub fn run(workspace: Option<PathBuf>) -> Result<()> {
    let resolver = open_workspace(workspace)?;
    let lock = resolver.ensure_lock_file()?;

    let analyzer = DependencyAnalyzer::new(resolver.sources(), resolver.configs());
    let cycles = analyzer.detect_circular_dependencies(&lock)?;

    if cycles.is_empty() {
        println!("No circular dependencies.");
        return Ok(());
    }

    println!(
        "{} ({}):",
        style("Circular dependencies").yellow().bold(),
        cycles.len()
    );
    for cycle in &cycles {
        println!("  {}", cycle.join(" -> "));
    }
    Ok(())
}
