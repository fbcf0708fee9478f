use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{MskError, Result};

/// User-level configuration, loaded from `<config dir>/msk/config.toml`.
///
/// Every field has a sensible default so msk works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory where `.msk` files are stored.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: PathBuf,

    /// Seconds before a copied password is cleared from the clipboard.
    #[serde(default = "default_clipboard_clear_secs")]
    pub clipboard_clear_secs: u64,

    /// Length of passwords produced by `--generate`.
    #[serde(default = "default_generated_length")]
    pub generated_length: usize,

    /// Whether generated passwords include symbols.
    #[serde(default = "default_generated_symbols")]
    pub generated_symbols: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".msk")
        .join("vault")
}

fn default_clipboard_clear_secs() -> u64 {
    15
}

fn default_generated_length() -> usize {
    16
}

fn default_generated_symbols() -> bool {
    true
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            clipboard_clear_secs: default_clipboard_clear_secs(),
            generated_length: default_generated_length(),
            generated_symbols: default_generated_symbols(),
        }
    }
}

impl Settings {
    /// Name of the config file inside the `msk` config directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Default location of the config file.
    ///
    /// Example: `~/.config/msk/config.toml` on Linux
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| {
            MskError::ConfigError("could not determine the user config directory".into())
        })?;
        Ok(base.join("msk").join(Self::FILE_NAME))
    }

    /// Load settings from `path`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            MskError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        Ok(settings)
    }

    /// Write settings to `path` via a temp file and rename, owner-only.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MskError::ConfigError(format!("Failed to serialize settings: {e}")))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        let written = write_private(&tmp_path, contents.as_bytes())
            .and_then(|()| fs::rename(&tmp_path, path));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

// ── Tests ────────────────────────────────────────────────────────────
