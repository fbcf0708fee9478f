//! `msk add` — encrypt and store a new password.

use tokio_util::sync::CancellationToken;

use crate::cli::output;
use crate::cli::{load_settings, open_store, read_secret_value, unlock, validate_secret_name};
use crate::cli::{Cli, GenerateArgs};
use crate::errors::Result;

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    cancel: &CancellationToken,
    name: &str,
    generate: &GenerateArgs,
) -> Result<()> {
    validate_secret_name(name)?;

    let settings = load_settings(cli)?;
    let store = open_store(&settings)?;

    unlock(false, |keys| {
        let password = read_secret_value(name, generate, &settings)?;
        store.add_secret(keys, cancel, name, &password)
    })?;

    output::success(&format!("Password '{name}' added"));
    if generate.generate {
        output::tip(&format!("Run `msk get {name}` to copy it"));
    }

    Ok(())
}
