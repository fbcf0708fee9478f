//! `msk get` — decrypt a password and copy it to the clipboard.

use std::io::{self, Write};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cli::{clipboard, load_settings, open_store, unlock, validate_secret_name, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, cancel: &CancellationToken, name: &str, print: bool) -> Result<()> {
    validate_secret_name(name)?;

    let settings = load_settings(cli)?;
    let store = open_store(&settings)?;

    let password = unlock(false, |keys| store.get_secret(keys, cancel, name))?;

    if print {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&password)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        return Ok(());
    }

    clipboard::copy_then_clear(
        &password,
        Duration::from_secs(settings.clipboard_clear_secs),
        cancel,
    )
}
