//! CLI module — Clap argument parser, prompts, and command implementations.

pub mod clipboard;
pub mod commands;
pub mod generator;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::MasterKeyStore;
use crate::errors::{MskError, Result};
use crate::vault::VaultStore;

/// Environment variable that supplies the master password non-interactively.
pub const MASTER_PASSWORD_ENV: &str = "MSK_MASTER_PASSWORD";

/// Longest accepted secret name, in bytes.
const MAX_NAME_LEN: usize = 255;

/// Device names Windows refuses as file names, with or without extension.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// msk: offline password manager.
#[derive(Parser)]
#[command(
    name = "msk",
    about = "Offline password manager that encrypts each credential with your master password",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (overrides the config file)
    #[arg(long, env = "MSK_VAULT_DIR", global = true)]
    pub vault_dir: Option<PathBuf>,

    /// Path to the config file (default: <config dir>/msk/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Add a new password to the vault
    #[command(visible_alias = "a")]
    Add {
        /// Password name (e.g. github)
        name: String,

        #[command(flatten)]
        generate: GenerateArgs,
    },

    /// Copy a password to the clipboard
    #[command(visible_alias = "g")]
    Get {
        /// Password name
        name: String,

        /// Print to stdout instead of using the clipboard
        #[arg(long)]
        print: bool,
    },

    /// Replace an existing password
    #[command(visible_alias = "u")]
    Update {
        /// Password name
        name: String,

        #[command(flatten)]
        generate: GenerateArgs,
    },

    /// Delete a password from the vault
    #[command(visible_alias = "d", alias = "del")]
    Delete {
        /// Password name
        name: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List stored password names
    #[command(visible_alias = "l")]
    List,

    /// Write the config file and create the vault directory
    Config {
        /// Overwrite an existing config without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options for generating a random password instead of typing one.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// Generate a random password
    #[arg(long)]
    pub generate: bool,

    /// Length of the generated password (default from config)
    #[arg(long, requires = "generate")]
    pub length: Option<usize>,

    /// Leave symbols out of the generated password
    #[arg(long, requires = "generate")]
    pub no_symbols: bool,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Path of the config file: `--config` if given, else the default location.
pub fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Settings::default_path(),
    }
}

/// Load settings and apply the `--vault-dir` / `MSK_VAULT_DIR` override.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(&config_path(cli)?)?;
    if let Some(dir) = &cli.vault_dir {
        settings.vault_dir = dir.clone();
    }
    Ok(settings)
}

/// Open the vault directory named by `settings`.
pub fn open_store(settings: &Settings) -> Result<VaultStore> {
    VaultStore::open(&settings.vault_dir)
}

/// Get the master password, trying in order:
/// 1. `MSK_MASTER_PASSWORD` env var (scripts, tests)
/// 2. Interactive prompt, asked twice when `confirm` is set
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_master_password(confirm: bool) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(MASTER_PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let password = read_password("Enter master password")?;
    if password.is_empty() {
        return Err(MskError::InvalidMasterKey);
    }

    if confirm {
        let again = read_password("Enter master password again to confirm")?;
        if !passwords_match(&password, &again) {
            return Err(MskError::PasswordMismatch);
        }
    }

    Ok(password)
}

/// Read the value to store for `name`.
///
/// With `--generate` a random password is produced. Otherwise piped stdin
/// is read (trailing newline stripped), or the user is prompted.
pub fn read_secret_value(
    name: &str,
    generate: &GenerateArgs,
    settings: &Settings,
) -> Result<Zeroizing<Vec<u8>>> {
    if generate.generate {
        let length = generate.length.unwrap_or(settings.generated_length);
        let symbols = settings.generated_symbols && !generate.no_symbols;
        return Ok(generator::generate_password(length, symbols));
    }

    let value = if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let len = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(len);
        buf
    } else {
        read_password(&format!("Enter password for {name}"))?
    };

    if value.is_empty() {
        return Err(MskError::CommandFailed("password cannot be empty".into()));
    }
    Ok(into_bytes(value))
}

/// Configure a key store from the master password, run `f`, then destroy it.
pub fn unlock<T, F>(confirm: bool, f: F) -> Result<T>
where
    F: FnOnce(&MasterKeyStore) -> Result<T>,
{
    let keys = MasterKeyStore::new();
    {
        let password = prompt_master_password(confirm)?;
        keys.configure(password.as_bytes());
    }

    let result = f(&keys);
    keys.destroy();
    result
}

/// Validate a secret name before it reaches the vault.
///
/// Allowed: ASCII letters, digits, hyphens, and underscores, 1 to 255
/// bytes. Windows device names (CON, COM1, ...) are rejected on every
/// platform so a vault stays portable.
pub fn validate_secret_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MskError::InvalidName("name cannot be empty".into()));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(MskError::InvalidName(format!(
            "name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }

    if name.contains(['/', '\\']) {
        return Err(MskError::InvalidName(format!(
            "'{name}' cannot contain path separators"
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MskError::InvalidName(format!(
            "'{name}' is invalid — only letters, digits, hyphens, and underscores are allowed"
        )));
    }

    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
    {
        return Err(MskError::InvalidName(format!(
            "'{name}' is a reserved system name"
        )));
    }

    Ok(())
}

fn read_password(prompt: &str) -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| MskError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

fn passwords_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Move the string's buffer into a byte vector without copying it.
fn into_bytes(mut value: Zeroizing<String>) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(std::mem::take(&mut *value).into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn valid_secret_names() {
        for name in ["github", "my-password", "MyPassword123", "secret_key", "A1_b2-C3", "a"] {
            assert!(validate_secret_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_empty_name() {
        assert!(validate_secret_name("").is_err());
    }

    #[test]
    fn rejects_too_long_name() {
        assert!(validate_secret_name(&"a".repeat(255)).is_ok());
        assert!(validate_secret_name(&"a".repeat(256)).is_err());
    }

    #[test]
    fn rejects_special_chars() {
        for name in [
            "my password",
            "my\tpassword",
            "test\x00name",
            "path/to/secret",
            "path\\to\\secret",
            "..",
            "file.txt",
            "my@password",
            "key=value",
            "日本語",
        ] {
            assert!(validate_secret_name(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn rejects_reserved_names_case_insensitively() {
        for name in ["CON", "con", "Prn", "AUX", "nul", "COM1", "com9", "LPT5"] {
            assert!(validate_secret_name(name).is_err(), "{name} should be rejected");
        }
        assert!(validate_secret_name("COM10").is_ok());
        assert!(validate_secret_name("console").is_ok());
    }

    #[test]
    fn passwords_match_is_exact() {
        assert!(passwords_match("hunter2", "hunter2"));
        assert!(!passwords_match("hunter2", "hunter3"));
        assert!(!passwords_match("hunter2", "hunter22"));
    }

    #[test]
    fn into_bytes_keeps_content() {
        let bytes = into_bytes(Zeroizing::new("p@ss1".to_string()));
        assert_eq!(bytes.as_slice(), b"p@ss1");
    }

    #[test]
    fn generate_flag_produces_requested_length() {
        let args = GenerateArgs {
            generate: true,
            length: Some(24),
            no_symbols: true,
        };
        let value = read_secret_value("github", &args, &Settings::default()).unwrap();
        assert_eq!(value.len(), 24);
        assert!(value.iter().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn vault_dir_flag_overrides_config() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cli = Cli::parse_from([
            "msk",
            "--config",
            tmp.path().join("config.toml").to_str().unwrap(),
            "--vault-dir",
            "/tmp/elsewhere",
            "list",
        ]);
        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.vault_dir, PathBuf::from("/tmp/elsewhere"));
    }
}
