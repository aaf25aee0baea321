use clap::{Parser, Subcommand};

/// Arguments for cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show cache statistics:\n    dlang-deps cache\n\n\
                  Clear all cached snapshots:\n    dlang-deps cache clear")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// Remove every cached snapshot
    Clear,
}
