//! Atomic byte-blob persistence.
//!
//! `Storage::store` never lets a reader see a half-written file:
//!
//! 1. Write the bytes to a temp file in the same directory.
//! 2. Check the full length landed and sync it to disk.
//! 3. Rename the temp file over the target path.
//!
//! The temp file is in the same directory so the rename stays on one
//! filesystem and is atomic.  If anything fails before the rename the
//! temp file is removed and the target keeps its previous contents.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{Result, VaultError};

/// Reads and atomically writes whole files.
#[derive(Debug, Default, Clone, Copy)]
pub struct Storage;

impl Storage {
    pub fn new() -> Self {
        Self
    }

    /// Atomically replace the contents of `path` with `bytes`.
    pub fn store(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.commit(path, bytes, false)
    }

    /// Like [`store`](Self::store), but the committed file is readable and
    /// writable by the owner only (Unix).  Used for key files.
    pub fn store_private(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.commit(path, bytes, true)
    }

    /// Write `bytes` into an already open writer and flush it.
    ///
    /// This path is not atomic: the writer decides where the bytes go.
    pub fn store_to<W: Write>(&self, writer: &mut W, bytes: &[u8]) -> Result<()> {
        writer
            .write_all(bytes)
            .map_err(|e| VaultError::io("failed to write blob", e))?;
        writer
            .flush()
            .map_err(|e| VaultError::io("failed to flush blob", e))
    }

    /// Read the full contents of `path`.
    pub fn load(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| {
            VaultError::io(
                format!("failed to open {} for reading", path.display()),
                e,
            )
        })
    }

    fn commit(&self, path: &Path, bytes: &[u8], private: bool) -> Result<()> {
        let tmp_path = temp_path_for(path);

        let result = write_temp(&tmp_path, bytes, private).and_then(|()| {
            fs::rename(&tmp_path, path).map_err(|e| {
                VaultError::io(
                    format!("failed to commit {} atomically", path.display()),
                    e,
                )
            })
        });

        if result.is_err() {
            // Best effort: the target is untouched either way.
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

/// `dir/.name.tmp` next to the target.
fn temp_path_for(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

fn write_temp(tmp_path: &Path, bytes: &[u8], private: bool) -> Result<()> {
    let mut file = create_file(tmp_path, private).map_err(|e| {
        VaultError::io(
            format!("failed to open {} for writing", tmp_path.display()),
            e,
        )
    })?;

    file.write_all(bytes)
        .map_err(|e| VaultError::io("failed to write blob", e))?;

    let written = file
        .metadata()
        .map_err(|e| VaultError::io("failed to stat temp file", e))?
        .len();
    if written != bytes.len() as u64 {
        return Err(VaultError::io_other(
            "failed to write entire blob",
            format!("wrote {written} of {} bytes", bytes.len()),
        ));
    }

    file.sync_all()
        .map_err(|e| VaultError::io("failed to sync temp file", e))
}

fn create_file(path: &Path, private: bool) -> std::io::Result<File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        if private {
            options.mode(0o600);
            let file = options.open(path)?;
            // `mode` only applies on creation; a stale temp file keeps its own.
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
            return Ok(file);
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    options.open(path)
}
