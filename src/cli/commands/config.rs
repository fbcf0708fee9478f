//! `msk config` — write the config file and create the vault directory.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::cli::{config_path, output, Cli};
use crate::config::Settings;
use crate::errors::{MskError, Result};
use crate::vault::FileRepository;

/// Execute the `config` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let path = config_path(cli)?;

    if path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt(format!("Config already exists at {}. Overwrite?", path.display()))
            .default(false)
            .interact()
            .map_err(|e| MskError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !overwrite {
            output::info("Config unchanged.");
            return Ok(());
        }
    }

    let mut settings = Settings::load(&path)?;
    settings.vault_dir = match &cli.vault_dir {
        Some(dir) => dir.clone(),
        None if io::stdin().is_terminal() => ask_vault_dir(&settings)?,
        None => settings.vault_dir.clone(),
    };

    // Creates the directory owner-only if it does not exist yet.
    FileRepository::open(&settings.vault_dir)?;
    settings.save(&path)?;

    output::success(&format!(
        "Config saved to {}. Vault path: {}",
        path.display(),
        settings.vault_dir.display()
    ));

    Ok(())
}

fn ask_vault_dir(current: &Settings) -> Result<PathBuf> {
    let answer: String = Input::new()
        .with_prompt("Vault directory")
        .default(current.vault_dir.display().to_string())
        .interact_text()
        .map_err(|e| MskError::CommandFailed(format!("input prompt: {e}")))?;

    Ok(PathBuf::from(answer.trim()))
}
