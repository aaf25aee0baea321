//! CLI definitions using clap derive API
//!
//! One submodule per command group:
//! - install: install/update arguments
//! - analyze: tree, why and cycles arguments
//! - audit: governance audit arguments
//! - resolve: import resolution and version policy arguments
//! - cache: cache command arguments
//! - completions: completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod analyze;
pub mod audit;
pub mod cache;
pub mod completions;
pub mod install;
pub mod resolve;

pub use analyze::{TreeArgs, WhyArgs};
pub use audit::AuditArgs;
pub use cache::{CacheArgs, CacheSubcommand};
pub use completions::CompletionsArgs;
pub use install::InstallArgs;
pub use resolve::{ResolveArgs, VersionsArgs};

/// dlang-deps - dependency manager for modeling-language workspaces
#[derive(Parser, Debug)]
#[command(
    name = "dlang-deps",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Git-based dependency manager for modeling-language workspaces",
    long_about = "dlang-deps resolves the git dependencies declared in model.yaml, pins them \
                  in model.lock and keeps content-addressed snapshots under ~/.dlang/packages.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  dlang-deps install                  \x1b[90m# Resolve and lock dependencies\x1b[0m\n   \
                  dlang-deps install --update         \x1b[90m# Re-resolve every ref\x1b[0m\n   \
                  dlang-deps tree --commits           \x1b[90m# Show the dependency tree\x1b[0m\n   \
                  dlang-deps why acme/patterns        \x1b[90m# Who depends on a package\x1b[0m\n   \
                  dlang-deps audit                    \x1b[90m# Check the governance policy\x1b[0m\n   \
                  dlang-deps resolve core/types       \x1b[90m# Map an import to a file\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Workspace directory (defaults to current directory)
    #[arg(long, short = 'w', global = true, env = "DLANG_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve dependencies and write model.lock
    Install(InstallArgs),

    /// Show the locked dependency tree
    Tree(TreeArgs),

    /// Show which packages depend on a package
    Why(WhyArgs),

    /// Report circular dependencies among locked packages
    Cycles,

    /// Check locked dependencies against the governance policy
    Audit(AuditArgs),

    /// Resolve an import specifier to a file
    Resolve(ResolveArgs),

    /// List available versions of a package
    Versions(VersionsArgs),

    /// Show cache statistics or clear the cache
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
