//! `msk delete` — remove a password from the vault.

use dialoguer::Confirm;
use tokio_util::sync::CancellationToken;

use crate::cli::output;
use crate::cli::{load_settings, open_store, unlock, validate_secret_name, Cli};
use crate::errors::{MskError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, cancel: &CancellationToken, name: &str, force: bool) -> Result<()> {
    validate_secret_name(name)?;

    let settings = load_settings(cli)?;
    let store = open_store(&settings)?;

    if !store.exists(cancel, name)? {
        return Err(MskError::NotFound(name.to_string()));
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete password '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| MskError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    // The master password is asked twice for destructive operations.
    unlock(true, |keys| store.delete_secret(keys, cancel, name))?;

    output::success(&format!("Password '{name}' deleted"));

    Ok(())
}
