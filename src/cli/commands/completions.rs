//! `msk completions` — generate shell completion scripts.
//!
//! Usage:
//!   msk completions bash > ~/.local/share/bash-completion/completions/msk
//!   msk completions zsh > ~/.zfunc/_msk
//!   msk completions fish > ~/.config/fish/completions/msk.fish

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    write_completions(shell, &mut io::stdout().lock())
}

/// Render the completion script for `shell` into `out`.
pub fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
    out.flush()?;
    Ok(())
}
