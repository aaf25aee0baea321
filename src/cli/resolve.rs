use clap::Parser;
use std::path::PathBuf;

/// Arguments for the resolve command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Relative import:\n    dlang-deps resolve ./types --from models/\n\n\
                  Path alias:\n    dlang-deps resolve @shared/money\n\n\
                  Installed dependency:\n    dlang-deps resolve acme/core/types")]
pub struct ResolveArgs {
    /// Import specifier as written in a document
    pub specifier: String,

    /// Directory of the importing document (defaults to the workspace)
    #[arg(long)]
    pub from: Option<PathBuf>,
}

/// Arguments for the versions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  All tags:\n    dlang-deps versions acme/core\n\n\
                  Highest stable tag:\n    dlang-deps versions acme/core --policy stable")]
pub struct VersionsArgs {
    /// Package specifier (owner/repo or a git URL)
    pub package: String,

    /// Version policy to apply: latest, stable, or an exact version
    #[arg(long)]
    pub policy: Option<String>,
}
