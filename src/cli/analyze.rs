use clap::Parser;

/// Arguments for the tree command
#[derive(Parser, Debug)]
pub struct TreeArgs {
    /// Show abbreviated commit hashes
    #[arg(long)]
    pub commits: bool,
}

/// Arguments for the why command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  By package key:\n    dlang-deps why acme/patterns\n\n\
                  By manifest alias:\n    dlang-deps why core")]
pub struct WhyArgs {
    /// Package key (owner/repo) or dependency alias
    pub package: String,
}
