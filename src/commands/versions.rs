//! Versions command implementation
//!
//! Lists the tags a package's remote advertises, optionally narrowed to the
//! one a version policy selects.

use console::style;

use dlang_deps::analysis::{VersionPolicy, resolve_version_policy};
use dlang_deps::error::Result;
use dlang_deps::settings::Settings;
use dlang_deps::source::GitSourceResolver;

use crate::cli::VersionsArgs;

/// Run versions command
pub fn run(args: VersionsArgs) -> Result<()> {
    let sources = GitSourceResolver::new(&Settings::from_env()?);
    let tags = sources.list_remote_tags(&args.package)?;

    let Some(policy) = args.policy else {
        if tags.is_empty() {
            println!("No tags found for {}.", args.package);
        }
        for tag in &tags {
            println!("{tag}");
        }
        return Ok(());
    };

    let policy: VersionPolicy = policy.parse()?;
    let package_key = sources.parse(&args.package)?.package_key();
    let selection = resolve_version_policy(&package_key, &policy, &tags)?;
    for candidate in &selection.candidates {
        if *candidate == selection.version {
            println!("{} {}", style(candidate).green().bold(), style("(selected)").dim());
        } else {
            println!("{candidate}");
        }
    }
    Ok(())
}
