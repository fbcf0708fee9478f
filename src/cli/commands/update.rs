//! `msk update` — replace the password stored under an existing name.

use tokio_util::sync::CancellationToken;

use crate::cli::output;
use crate::cli::{load_settings, open_store, read_secret_value, unlock, validate_secret_name};
use crate::cli::{Cli, GenerateArgs};
use crate::errors::{MskError, Result};

/// Execute the `update` command.
pub fn execute(
    cli: &Cli,
    cancel: &CancellationToken,
    name: &str,
    generate: &GenerateArgs,
) -> Result<()> {
    validate_secret_name(name)?;

    let settings = load_settings(cli)?;
    let store = open_store(&settings)?;

    // Fail before prompting for anything if there is nothing to update.
    if !store.exists(cancel, name)? {
        return Err(MskError::NotFound(name.to_string()));
    }

    unlock(false, |keys| {
        let password = read_secret_value(name, generate, &settings)?;
        store.update_secret(keys, cancel, name, &password)
    })?;

    output::success(&format!("Password '{name}' updated"));

    Ok(())
}
