//! Shell completions command

use clap::CommandFactory;

use dlang_deps::error::Result;

use crate::cli::{Cli, CompletionsArgs};

/// Generate shell completions
pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "dlang-deps", &mut std::io::stdout().lock());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_complete::Shell;

    #[test]
    fn test_completions_every_shell() {
        for shell in [Shell::Bash, Shell::Elvish, Shell::Fish, Shell::PowerShell, Shell::Zsh] {
            assert!(run(CompletionsArgs { shell }).is_ok());
        }
    }
}
