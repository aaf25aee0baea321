use clap::Parser;

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install from model.yaml, reusing model.lock when present:\n    dlang-deps install\n\n\
                   Re-resolve every ref and rewrite model.lock:\n    dlang-deps install --update")]
pub struct InstallArgs {
    /// Ignore the existing lock file and re-resolve every ref
    #[arg(long, short = 'u')]
    pub update: bool,
}
