//! The vault ledger: an append-only record of encrypted artifacts.
//!
//! `VaultLedger` ties a cipher driver, a key and [`Storage`] together:
//! encrypt a file, commit the ciphertext atomically under the storage
//! directory, then append a [`VaultEntry`] describing it.  Decryption
//! reads an entry's stored artifact back through the same driver.
//!
//! The ledger borrows drivers per call; it never owns them.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use zeroize::Zeroizing;

use super::entry::VaultEntry;
use super::storage::Storage;
use crate::crypto::{Key, Symmetric};
use crate::driver::{CipherDriver, CipherEngine, NONCE_PREFIX_LEN};
use crate::errors::{Result, VaultError};

/// Extension appended to the original file name for stored artifacts.
pub const ARTIFACT_EXTENSION: &str = "vault";

/// Ciphertext plus the nonce it starts with, when the driver has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub ciphertext: Vec<u8>,
    pub nonce: Option<Vec<u8>>,
}

pub struct VaultLedger {
    /// Entries in insertion order.
    entries: Vec<VaultEntry>,

    /// Absolute directory where artifacts are stored by convention.
    storage_dir: PathBuf,

    storage: Storage,
}

impl VaultLedger {
    /// Create an empty ledger rooted at `storage_dir`, creating it if needed.
    pub fn new(storage_dir: &Path) -> Result<Self> {
        let mut ledger = Self {
            entries: Vec::new(),
            storage_dir: PathBuf::new(),
            storage: Storage::new(),
        };
        ledger.set_storage_directory(storage_dir)?;
        Ok(ledger)
    }

    // ------------------------------------------------------------------
    // Cipher orchestration
    // ------------------------------------------------------------------

    /// Encrypt `plaintext` with `driver` and a symmetric key.
    ///
    /// When the driver prefixes its output with a nonce, the nonce is
    /// copied out for bookkeeping.  This is metadata only; nothing here
    /// depends on it for decryption.
    pub fn encrypt_symmetric(
        &self,
        driver: &dyn CipherDriver,
        plaintext: &[u8],
        key: &Key<Symmetric>,
    ) -> Result<SealedPayload> {
        let ciphertext = CipherEngine::new(driver).encrypt_with(plaintext, key)?;

        let nonce = (driver.prefixes_nonce() && ciphertext.len() > NONCE_PREFIX_LEN)
            .then(|| ciphertext[..NONCE_PREFIX_LEN].to_vec());

        Ok(SealedPayload { ciphertext, nonce })
    }

    /// Decrypt `ciphertext` with `driver` and a symmetric key.
    ///
    /// The plaintext is wiped when the returned value is dropped.
    pub fn decrypt_symmetric(
        &self,
        driver: &dyn CipherDriver,
        ciphertext: &[u8],
        key: &Key<Symmetric>,
    ) -> Result<Zeroizing<Vec<u8>>> {
        CipherEngine::new(driver)
            .decrypt_with(ciphertext, key)
            .map(Zeroizing::new)
    }

    /// Encrypt the file at `original_path` into the storage directory and
    /// record it.
    ///
    /// The artifact is committed atomically before the entry is appended,
    /// so every entry points at a complete file.
    pub fn encrypt_file(
        &mut self,
        driver: &dyn CipherDriver,
        original_path: &Path,
        key: &Key<Symmetric>,
    ) -> Result<&VaultEntry> {
        let plaintext = Zeroizing::new(self.storage.load(original_path)?);
        let sealed = self.encrypt_symmetric(driver, &plaintext, key)?;

        let stored_path = self.unused_stored_path(original_path)?;
        self.storage.store(&stored_path, &sealed.ciphertext)?;

        debug!(
            original = %original_path.display(),
            stored = %stored_path.display(),
            algorithm = driver.name(),
            "stored vault artifact"
        );

        self.add_entry(VaultEntry {
            original_path: original_path.to_path_buf(),
            stored_path,
            algorithm: driver.name().to_string(),
            nonce: sealed.nonce.unwrap_or_default(),
            timestamp: Utc::now(),
        });

        // Just pushed, so the ledger is non-empty.
        self.entries
            .last()
            .ok_or_else(|| VaultError::EntryNotFound(self.entries.len()))
    }

    /// Load and decrypt the artifact of the entry at `index`.
    pub fn decrypt_entry(
        &self,
        driver: &dyn CipherDriver,
        index: usize,
        key: &Key<Symmetric>,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let entry = self.entry(index)?;
        let ciphertext = self.storage.load(&entry.stored_path)?;
        self.decrypt_symmetric(driver, &ciphertext, key)
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    /// Append an entry.  The caller must already have committed the artifact.
    pub fn add_entry(&mut self, entry: VaultEntry) {
        self.entries.push(entry);
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[VaultEntry] {
        &self.entries
    }

    /// The entry at `index` (0-based).
    pub fn entry(&self, index: usize) -> Result<&VaultEntry> {
        self.entries
            .get(index)
            .ok_or(VaultError::EntryNotFound(index + 1))
    }

    // ------------------------------------------------------------------
    // Storage
    // ------------------------------------------------------------------

    pub fn storage_directory(&self) -> &Path {
        &self.storage_dir
    }

    /// Point the ledger at a new storage directory, creating it if absent.
    pub fn set_storage_directory(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| {
                VaultError::io(
                    format!("failed to create storage directory {}", path.display()),
                    e,
                )
            })?;
        }
        self.storage_dir = fs::canonicalize(path).map_err(|e| {
            VaultError::io(
                format!("failed to resolve storage directory {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Where the artifact for `original_path` lives: `<storage_dir>/<name>.vault`.
    pub fn stored_path_for(&self, original_path: &Path) -> Result<PathBuf> {
        let name = original_path.file_name().ok_or_else(|| {
            VaultError::InvalidArgument(format!(
                "{} has no file name",
                original_path.display()
            ))
        })?;
        Ok(self.storage_dir.join(format!(
            "{}.{ARTIFACT_EXTENSION}",
            name.to_string_lossy()
        )))
    }

    /// [`stored_path_for`](Self::stored_path_for), or `<name>.<n>.vault`
    /// with the smallest `n >= 2` that no entry or file already uses.
    ///
    /// Artifacts are never shared between entries, so encrypting two files
    /// with the same name keeps both.
    pub fn unused_stored_path(&self, original_path: &Path) -> Result<PathBuf> {
        let first = self.stored_path_for(original_path)?;
        if self.is_free(&first) {
            return Ok(first);
        }

        let name = original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut n = 2usize;
        loop {
            let candidate = self
                .storage_dir
                .join(format!("{name}.{n}.{ARTIFACT_EXTENSION}"));
            if self.is_free(&candidate) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    fn is_free(&self, candidate: &Path) -> bool {
        !candidate.exists() && !self.entries.iter().any(|e| e.stored_path == candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::XorDriver;
    use tempfile::TempDir;

    #[test]
    fn new_creates_storage_directory() {
        let dir = TempDir::new().unwrap();
        let storage = dir.path().join("nested").join("vault");

        let ledger = VaultLedger::new(&storage).unwrap();
        assert!(storage.is_dir());
        assert!(ledger.storage_directory().is_absolute());
        assert!(ledger.entries().is_empty());
    }

    #[test]
    fn encrypt_symmetric_extracts_nonce() {
        let dir = TempDir::new().unwrap();
        let ledger = VaultLedger::new(dir.path()).unwrap();
        let key = Key::<Symmetric>::generate(128).unwrap();

        let sealed = ledger
            .encrypt_symmetric(&XorDriver, b"secret payload", &key)
            .unwrap();
        let nonce = sealed.nonce.as_deref().unwrap();
        assert_eq!(nonce, &sealed.ciphertext[..NONCE_PREFIX_LEN]);

        let plain = ledger
            .decrypt_symmetric(&XorDriver, &sealed.ciphertext, &key)
            .unwrap();
        assert_eq!(plain.as_slice(), b"secret payload");
    }

    #[test]
    fn no_nonce_when_ciphertext_is_only_a_nonce() {
        let dir = TempDir::new().unwrap();
        let ledger = VaultLedger::new(dir.path()).unwrap();
        let key = Key::<Symmetric>::generate(128).unwrap();

        let sealed = ledger.encrypt_symmetric(&XorDriver, b"", &key).unwrap();
        assert_eq!(sealed.nonce, None);
    }

    #[test]
    fn encrypt_file_stores_artifact_and_records_entry() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.txt");
        fs::write(&input, b"meeting at noon").unwrap();

        let mut ledger = VaultLedger::new(&dir.path().join("vault")).unwrap();
        let key = Key::<Symmetric>::import_from_passphrase(b"pw", 256).unwrap();

        let entry = ledger.encrypt_file(&XorDriver, &input, &key).unwrap().clone();
        assert_eq!(entry.original_path, input);
        assert_eq!(entry.algorithm, XorDriver::NAME);
        assert_eq!(entry.nonce.len(), NONCE_PREFIX_LEN);
        assert!(entry.stored_path.ends_with("notes.txt.vault"));
        assert_ne!(fs::read(&entry.stored_path).unwrap(), b"meeting at noon");

        let plain = ledger.decrypt_entry(&XorDriver, 0, &key).unwrap();
        assert_eq!(plain.as_slice(), b"meeting at noon");
    }

    #[test]
    fn entries_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let mut ledger = VaultLedger::new(dir.path()).unwrap();
        for name in ["b", "a", "c"] {
            ledger.add_entry(VaultEntry {
                original_path: PathBuf::from(name),
                stored_path: dir.path().join(name),
                algorithm: "x".into(),
                nonce: Vec::new(),
                timestamp: Utc::now(),
            });
        }
        let names: Vec<_> = ledger
            .entries()
            .iter()
            .map(|e| e.original_path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn decrypt_missing_entry_fails() {
        let dir = TempDir::new().unwrap();
        let ledger = VaultLedger::new(dir.path()).unwrap();
        let key = Key::<Symmetric>::generate(128).unwrap();
        assert!(matches!(
            ledger.decrypt_entry(&XorDriver, 3, &key),
            Err(VaultError::EntryNotFound(4))
        ));
    }

    #[test]
    fn set_storage_directory_switches_root() {
        let dir = TempDir::new().unwrap();
        let mut ledger = VaultLedger::new(&dir.path().join("one")).unwrap();
        ledger.set_storage_directory(&dir.path().join("two")).unwrap();

        let stored = ledger.stored_path_for(Path::new("/tmp/x.bin")).unwrap();
        assert!(stored.starts_with(ledger.storage_directory()));
        assert!(stored.ends_with("x.bin.vault"));
    }

    #[test]
    fn same_file_name_gets_a_fresh_artifact() {
        let dir = TempDir::new().unwrap();
        let key = Key::<Symmetric>::generate(128).unwrap();
        let mut ledger = VaultLedger::new(&dir.path().join("vault")).unwrap();

        let mut stored = Vec::new();
        for sub in ["a", "b", "c"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
            let input = dir.path().join(sub).join("notes.txt");
            fs::write(&input, sub).unwrap();
            stored.push(ledger.encrypt_file(&XorDriver, &input, &key).unwrap().stored_path.clone());
        }

        assert!(stored[0].ends_with("notes.txt.vault"));
        assert!(stored[1].ends_with("notes.txt.2.vault"));
        assert!(stored[2].ends_with("notes.txt.3.vault"));
    }

    #[test]
    fn stored_path_requires_file_name() {
        let dir = TempDir::new().unwrap();
        let ledger = VaultLedger::new(dir.path()).unwrap();
        assert!(matches!(
            ledger.stored_path_for(Path::new("/")),
            Err(VaultError::InvalidArgument(_))
        ));
    }
}
