//! dlang-deps - dependency manager for modeling-language workspaces
//!
//! Command line front end over the `dlang_deps` library: resolves and locks
//! git dependencies, renders dependency trees, audits governance policy and
//! maps import specifiers to files.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use dlang_deps::error::Result;

/// Log to stderr, filtered by `DLANG_LOG` (or `debug` with `--verbose`)
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("DLANG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let workspace = cli.workspace;
    let done = |()| ExitCode::SUCCESS;
    match cli.command {
        Commands::Install(args) => commands::install::run(workspace, args).map(done),
        Commands::Tree(args) => commands::tree::run(workspace, args).map(done),
        Commands::Why(args) => commands::why::run(workspace, args).map(done),
        Commands::Cycles => commands::cycles::run(workspace).map(done),
        Commands::Audit(args) => commands::audit::run(workspace, args)
            .map(|passed| if passed { ExitCode::SUCCESS } else { ExitCode::from(1) }),
        Commands::Resolve(args) => commands::resolve::run(workspace, args).map(done),
        Commands::Versions(args) => commands::versions::run(args).map(done),
        Commands::Cache(args) => commands::cache::run(args).map(done),
        Commands::Completions(args) => commands::completions::run(args).map(done),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}
