use clap::Parser;

/// Arguments for the audit command
#[derive(Parser, Debug)]
#[command(after_help = "Exits with status 1 when any violation has severity 'error'.")]
pub struct AuditArgs {
    /// Print violations as JSON instead of the text report
    #[arg(long)]
    pub json: bool,
}
