//! `msk list` — display stored password names in a table.

use tokio_util::sync::CancellationToken;

use crate::cli::output;
use crate::cli::{load_settings, open_store, Cli};
use crate::errors::Result;

/// Execute the `list` command. Names are not secret, so no password is asked.
pub fn execute(cli: &Cli, cancel: &CancellationToken) -> Result<()> {
    let settings = load_settings(cli)?;
    let store = open_store(&settings)?;

    let names = store.list_secrets(cancel)?;
    output::print_names_table(&names);

    Ok(())
}
