//! Shell completion generation command.
//!
//! This module provides the `completions` command which generates shell completion
//! scripts for bash, zsh, fish, and PowerShell.

use crate::cli::Cli;
use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

/// Name of the installed binary.
const BIN_NAME: &str = "tablebook";

/// Generate shell completion scripts
#[derive(Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    /// Execute the completions command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let mut cmd = Cli::command();

        if !global.quiet {
            eprintln!("# Generating {} completion script", self.shell);
            match self.shell {
                Shell::Bash => eprintln!(
                    "#   tablebook completions bash > ~/.local/share/bash-completion/completions/tablebook"
                ),
                Shell::Zsh => {
                    eprintln!("#   tablebook completions zsh > ~/.zsh/completions/_tablebook");
                }
                Shell::Fish => eprintln!(
                    "#   tablebook completions fish > ~/.config/fish/completions/tablebook.fish"
                ),
                Shell::PowerShell => eprintln!("#   tablebook completions powershell > $PROFILE"),
                _ => {}
            }
        }

        generate(self.shell, &mut cmd, BIN_NAME, &mut io::stdout());

        Ok(())
    }
}
