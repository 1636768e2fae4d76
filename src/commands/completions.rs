//! Completions command implementation
//!
//! Generates shell completion scripts via `clap_complete`. Redirect the
//! output to the completion directory of your shell, for example:
//!
//! ```bash
//! backup-source completions bash > ~/.local/share/bash-completion/completions/backup-source
//! ```

use std::io;

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "backup-source", &mut io::stdout());
    Ok(())
}
