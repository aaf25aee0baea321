use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    dlang-deps completions bash > ~/.bash_completion.d/dlang-deps\n\n\
                  Generate zsh completions:\n    dlang-deps completions zsh > ~/.zfunc/_dlang-deps\n\n\
                  Generate fish completions:\n    dlang-deps completions fish > ~/.config/fish/completions/dlang-deps.fish\n\n\
                  Generate PowerShell completions:\n    dlang-deps completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
