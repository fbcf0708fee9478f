//! Durable storage of vault files, one `<name>.msk` file per secret.
//!
//! Names are lower-cased before they are mapped to a path, so lookups are
//! case-insensitive. Writes go to a `.tmp` sibling first, are flushed to
//! stable storage, and only then renamed over the real file, so a reader
//! never sees a half-written secret.
//!
//! Every operation checks the cancellation token once on entry. Nothing
//! here is interruptible mid-way; the check only stops the next I/O step.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::format::{self, FILE_EXTENSION};
use super::secret::EncryptedSecret;
use crate::errors::{MskError, Result};

/// Suffix appended to a vault file's name while it is being written.
const TMP_SUFFIX: &str = "tmp";

/// Storage backend for encrypted secrets.
pub trait VaultRepository {
    /// Check whether a file exists for `name` (case-insensitive).
    fn exists(&self, cancel: &CancellationToken, name: &str) -> Result<bool>;

    /// Atomically write `secret` under `name`, replacing any existing file.
    fn save(&self, cancel: &CancellationToken, name: &str, secret: &EncryptedSecret) -> Result<()>;

    /// Read the raw, still-encoded file bytes for `name`.
    fn get(&self, cancel: &CancellationToken, name: &str) -> Result<Vec<u8>>;

    /// Remove the file for `name`.
    fn delete(&self, cancel: &CancellationToken, name: &str) -> Result<bool>;

    /// List the names of all stored secrets, sorted.
    fn list(&self, cancel: &CancellationToken) -> Result<Vec<String>>;
}

type RenameFn = fn(&Path, &Path) -> io::Result<()>;

/// A vault directory on the local filesystem.
#[derive(Clone)]
pub struct FileRepository {
    dir: PathBuf,
    rename: RenameFn,
}

impl FileRepository {
    /// Open the vault directory at `dir`, creating it owner-only if absent.
    pub fn open(dir: &Path) -> Result<Self> {
        create_private_dir(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            rename: rename_file,
        })
    }

    /// The vault directory this repository reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve the path of the vault file for `name`.
    ///
    /// Example: `"GitHub"` -> `<dir>/github.msk`
    pub fn secret_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(MskError::InvalidName(format!(
                "'{name}' cannot be mapped to a vault file"
            )));
        }
        Ok(self
            .dir
            .join(format!("{}.{FILE_EXTENSION}", name.to_lowercase())))
    }

    #[cfg(test)]
    fn with_rename(mut self, rename: RenameFn) -> Self {
        self.rename = rename;
        self
    }
}

impl fmt::Debug for FileRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRepository")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl VaultRepository for FileRepository {
    fn exists(&self, cancel: &CancellationToken, name: &str) -> Result<bool> {
        check_cancelled(cancel)?;
        Ok(self.secret_path(name)?.is_file())
    }

    fn save(&self, cancel: &CancellationToken, name: &str, secret: &EncryptedSecret) -> Result<()> {
        check_cancelled(cancel)?;

        let path = self.secret_path(name)?;
        let tmp_path = tmp_path_for(&path);
        let bytes = format::encode_envelope(secret);

        debug!(name, path = %path.display(), "writing secret");

        // The guard removes the temp file unless the rename succeeds.
        let mut tmp = TempFile::create(&tmp_path)?;
        tmp.write_synced(&bytes)?;
        tmp.persist(&path, self.rename)?;

        sync_dir(&self.dir);
        Ok(())
    }

    fn get(&self, cancel: &CancellationToken, name: &str) -> Result<Vec<u8>> {
        check_cancelled(cancel)?;

        let path = self.secret_path(name)?;
        match fs::read(&path) {
            Ok(data) => {
                debug!(name, bytes = data.len(), "read secret file");
                Ok(data)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(MskError::NotFound(name.into())),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, cancel: &CancellationToken, name: &str) -> Result<bool> {
        check_cancelled(cancel)?;

        let path = self.secret_path(name)?;
        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MskError::NotFound(name.into()))
            }
            Err(e) => return Err(e.into()),
        };
        if !meta.is_file() {
            return Err(MskError::InvalidVaultEntry(path));
        }

        debug!(name, path = %path.display(), "deleting secret");
        fs::remove_file(&path)?;
        sync_dir(&self.dir);
        Ok(true)
    }

    fn list(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        check_cancelled(cancel)?;

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }

            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if stem.is_empty() => {}
                // Lookups always lower-case, so a mixed-case file is unreachable.
                Some(stem) if stem != stem.to_lowercase() => {
                    warn!(path = %path.display(), "skipping vault file with a non-lowercase name")
                }
                Some(stem) => names.push(stem.to_string()),
                None => warn!(path = %path.display(), "skipping vault file with a non-UTF-8 name"),
            }
        }

        names.sort();
        Ok(names)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rename_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(MskError::Cancelled);
    }
    Ok(())
}

/// `<dir>/github.msk` -> `<dir>/github.msk.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(TMP_SUFFIX);
    path.with_file_name(name)
}

fn create_private_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
    }

    #[cfg(not(unix))]
    {
        fs::create_dir_all(dir)
    }
}

/// Best-effort fsync of the directory entry after a rename or unlink.
fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        debug!(dir = %dir.display(), "directory sync skipped: {e}");
    }

    #[cfg(not(unix))]
    let _ = dir;
}

/// A temporary file that is deleted on drop unless it was persisted.
struct TempFile {
    path: PathBuf,
    file: Option<File>,
    persisted: bool,
}

impl TempFile {
    fn create(path: &Path) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            persisted: false,
        })
    }

    /// Write `bytes` and flush them to stable storage.
    fn write_synced(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        Ok(())
    }

    /// Close the file and rename it over `target`.
    fn persist(&mut self, target: &Path, rename: RenameFn) -> io::Result<()> {
        // Close before renaming; Windows refuses to rename open files.
        drop(self.file.take());
        rename(&self.path, target)?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        drop(self.file.take());
        if !self.persisted {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), "could not remove temp file: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> (TempDir, FileRepository) {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::open(&dir.path().join("vault")).unwrap();
        (dir, repo)
    }

    fn envelope(fill: u8) -> EncryptedSecret {
        EncryptedSecret {
            salt: [fill; 16],
            nonce: [fill; 12],
            ciphertext: vec![fill; 24],
        }
    }

    fn failing_rename(_from: &Path, _to: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "simulated rename failure"))
    }

    fn leftover_tmp_files(repo: &FileRepository) -> Vec<PathBuf> {
        fs::read_dir(repo.dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(TMP_SUFFIX))
            .collect()
    }

    #[test]
    fn open_creates_owner_only_directory() {
        let (_dir, repo) = repo();
        assert!(repo.dir().is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(repo.dir()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[test]
    fn secret_path_lowercases_name() {
        let (_dir, repo) = repo();
        let path = repo.secret_path("MySecret").unwrap();
        assert_eq!(path, repo.dir().join("mysecret.msk"));
    }

    #[test]
    fn secret_path_rejects_path_like_names() {
        let (_dir, repo) = repo();
        for name in ["", ".", "..", "a/b", "..\\evil"] {
            assert!(repo.secret_path(name).is_err(), "{name:?} must be rejected");
        }
    }

    #[test]
    fn save_writes_exact_envelope_bytes() {
        let (_dir, repo) = repo();
        let cancel = CancellationToken::new();
        let secret = envelope(0x42);

        repo.save(&cancel, "github", &secret).unwrap();

        let on_disk = fs::read(repo.dir().join("github.msk")).unwrap();
        assert_eq!(on_disk, format::encode_envelope(&secret));
        assert!(leftover_tmp_files(&repo).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, repo) = repo();
        repo.save(&CancellationToken::new(), "github", &envelope(1))
            .unwrap();

        let mode = fs::metadata(repo.dir().join("github.msk"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let (_dir, repo) = repo();
        let cancel = CancellationToken::new();

        repo.save(&cancel, "github", &envelope(1)).unwrap();
        repo.save(&cancel, "GitHub", &envelope(2)).unwrap();

        let data = repo.get(&cancel, "github").unwrap();
        assert_eq!(data, format::encode_envelope(&envelope(2)));
        assert_eq!(repo.list(&cancel).unwrap(), vec!["github".to_string()]);
    }

    #[test]
    fn failed_rename_keeps_previous_file_and_removes_tmp() {
        let (_dir, repo) = repo();
        let cancel = CancellationToken::new();

        repo.save(&cancel, "github", &envelope(1)).unwrap();
        let before = fs::read(repo.dir().join("github.msk")).unwrap();

        let broken = repo.clone().with_rename(failing_rename);
        let result = broken.save(&cancel, "github", &envelope(2));
        assert!(matches!(result, Err(MskError::Io(_))));

        let after = fs::read(repo.dir().join("github.msk")).unwrap();
        assert_eq!(before, after, "existing file must be untouched");
        assert!(leftover_tmp_files(&repo).is_empty(), "no .tmp may remain");
    }

    #[test]
    fn failed_rename_of_new_secret_leaves_nothing_behind() {
        let (_dir, repo) = repo();
        let cancel = CancellationToken::new();

        let broken = repo.clone().with_rename(failing_rename);
        assert!(broken.save(&cancel, "fresh", &envelope(3)).is_err());

        assert!(!repo.exists(&cancel, "fresh").unwrap());
        assert!(fs::read_dir(repo.dir()).unwrap().next().is_none());
    }

    #[test]
    fn get_missing_secret_is_not_found() {
        let (_dir, repo) = repo();
        let result = repo.get(&CancellationToken::new(), "nope");
        assert!(matches!(result, Err(MskError::NotFound(name)) if name == "nope"));
    }

    #[test]
    fn exists_is_case_insensitive() {
        let (_dir, repo) = repo();
        let cancel = CancellationToken::new();

        repo.save(&cancel, "MySecret", &envelope(1)).unwrap();
        assert!(repo.exists(&cancel, "mysecret").unwrap());
        assert!(repo.exists(&cancel, "MYSECRET").unwrap());
        assert!(!repo.exists(&cancel, "other").unwrap());
    }

    #[test]
    fn delete_removes_file_then_reports_not_found() {
        let (_dir, repo) = repo();
        let cancel = CancellationToken::new();

        repo.save(&cancel, "github", &envelope(1)).unwrap();
        assert!(repo.delete(&cancel, "GITHUB").unwrap());
        assert!(!repo.exists(&cancel, "github").unwrap());

        let again = repo.delete(&cancel, "github");
        assert!(matches!(again, Err(MskError::NotFound(_))));
    }

    #[test]
    fn delete_refuses_directories() {
        let (_dir, repo) = repo();
        fs::create_dir(repo.dir().join("folder.msk")).unwrap();

        let result = repo.delete(&CancellationToken::new(), "folder");
        assert!(matches!(result, Err(MskError::InvalidVaultEntry(_))));
        assert!(repo.dir().join("folder.msk").is_dir());
    }

    #[test]
    fn list_returns_sorted_names_and_skips_other_entries() {
        let (_dir, repo) = repo();
        let cancel = CancellationToken::new();

        repo.save(&cancel, "zebra", &envelope(1)).unwrap();
        repo.save(&cancel, "alpha", &envelope(2)).unwrap();
        fs::write(repo.dir().join("notes.txt"), b"x").unwrap();
        fs::write(repo.dir().join("stale.msk.tmp"), b"x").unwrap();
        fs::create_dir(repo.dir().join("nested.msk")).unwrap();

        let names = repo.list(&cancel).unwrap();
        assert_eq!(names, vec!["alpha".to_string(), "zebra".to_string()]);
    }

    #[test]
    fn list_skips_files_that_lookups_cannot_reach() {
        let (_dir, repo) = repo();
        let cancel = CancellationToken::new();

        repo.save(&cancel, "gitlab", &envelope(1)).unwrap();
        fs::write(repo.dir().join("GitHub.msk"), b"x").unwrap();

        let names = repo.list(&cancel).unwrap();
        assert_eq!(names, vec!["gitlab".to_string()]);
        for name in &names {
            assert!(repo.get(&cancel, name).is_ok(), "{name} must be readable");
        }
    }

    #[test]
    fn list_of_missing_directory_is_empty() {
        let (_dir, repo) = repo();
        fs::remove_dir(repo.dir()).unwrap();
        assert!(repo.list(&CancellationToken::new()).unwrap().is_empty());
    }

    #[test]
    fn cancelled_token_stops_every_operation() {
        let (_dir, repo) = repo();
        let cancel = CancellationToken::new();
        repo.save(&cancel, "github", &envelope(1)).unwrap();

        cancel.cancel();

        assert!(matches!(
            repo.exists(&cancel, "github"),
            Err(MskError::Cancelled)
        ));
        assert!(matches!(
            repo.save(&cancel, "github", &envelope(2)),
            Err(MskError::Cancelled)
        ));
        assert!(matches!(
            repo.get(&cancel, "github"),
            Err(MskError::Cancelled)
        ));
        assert!(matches!(
            repo.delete(&cancel, "github"),
            Err(MskError::Cancelled)
        ));
        assert!(matches!(repo.list(&cancel), Err(MskError::Cancelled)));

        // Nothing was touched.
        assert_eq!(
            fs::read(repo.dir().join("github.msk")).unwrap(),
            format::encode_envelope(&envelope(1))
        );
    }
}
