//! `msk version` — display version information.

use console::style;

use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("msk {current}");
    println!(
        "{}",
        style("Argon2id (t=2, m=64 MiB, p=4) + AES-256-GCM, file format v1").dim()
    );
    Ok(())
}
