//! Resolve command implementation

use std::path::PathBuf;

use dlang_deps::error::Result;
use dlang_deps::imports::ImportResolver;
use dlang_deps::workspace::WorkspaceResolver;

use super::start_dir;
use crate::cli::ResolveArgs;

/// Run resolve command
pub fn run(workspace: Option<PathBuf>, args: ResolveArgs) -> Result<()> {
    let resolver = WorkspaceResolver::from_env()?;
    let start = start_dir(workspace)?;
    let base_dir = match args.from {
        Some(from) if from.is_relative() => start.join(from),
        Some(from) => from,
        None => start,
    };

    let path = ImportResolver::new(&resolver).resolve_from(&base_dir, &args.specifier)?;
    println!("{}", path.display());
    Ok(())
}
