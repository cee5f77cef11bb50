//! Move-only key material, tagged with a sealed key category.
//!
//! `Key<C>` wraps exactly one [`SecureBuffer`], so the bytes are zeroed
//! when the key is dropped.  Keys are deliberately not `Clone`: the
//! only way to duplicate key bytes is [`Key::materialize`], which makes
//! the copy visible at the call site.
//!
//! Symmetric keys can be created from:
//! - the system RNG (`generate`)
//! - a raw key file (`import_from_file`, also available for asymmetric keys)
//! - a passphrase, via iterated SHA-256 (`import_from_passphrase`)
//! - a key metadata object with a base64 `key` field (`import_from_encoded_metadata`)

use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use rand::RngCore;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::metadata;
use super::secure_buffer::SecureBuffer;
use crate::errors::{Result, VaultError};

/// Key size used when the caller does not ask for one.
pub const DEFAULT_KEY_BITS: u32 = 256;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Symmetric {}
    impl Sealed for super::Asymmetric {}
}

/// Marker trait for the closed set of key categories.
pub trait KeyCategory: sealed::Sealed {
    const NAME: &'static str;
}

/// Category tag for secret keys shared by both sides of a cipher.
#[derive(Debug)]
pub enum Symmetric {}

/// Category tag for one half of a key pair.
#[derive(Debug)]
pub enum Asymmetric {}

impl KeyCategory for Symmetric {
    const NAME: &'static str = "symmetric";
}

impl KeyCategory for Asymmetric {
    const NAME: &'static str = "asymmetric";
}

/// Key material of category `C`, wiped on drop.
pub struct Key<C: KeyCategory> {
    buffer: SecureBuffer,
    label: Option<String>,
    _category: PhantomData<fn() -> C>,
}

impl<C: KeyCategory> Key<C> {
    /// Wrap an existing buffer as key material.
    pub fn new(buffer: SecureBuffer, label: Option<String>) -> Self {
        Self {
            buffer,
            label,
            _category: PhantomData,
        }
    }

    /// Read the entire file at `path` as raw key bytes.
    ///
    /// The file has no header or framing; its bytes become the key
    /// verbatim.  The label is set to `file:<path>`.
    pub fn import_from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            VaultError::io(format!("failed to open key file {}", path.display()), e)
        })?;
        Ok(Self::new(
            SecureBuffer::new(bytes),
            Some(format!("file:{}", path.display())),
        ))
    }

    /// Read-only view of the key bytes.
    pub fn raw(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Copy the key bytes into a new, independently owned buffer.
    pub fn materialize(&self) -> SecureBuffer {
        SecureBuffer::from_slice(self.buffer.as_bytes())
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn size_bits(&self) -> usize {
        self.buffer.len() * 8
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_wiped(&self) -> bool {
        self.buffer.is_wiped()
    }

    pub fn wipe(&mut self) {
        self.buffer.wipe();
    }

    /// Move the key out, leaving `self` wiped and empty.
    pub fn take(&mut self) -> Self {
        Self {
            buffer: self.buffer.take(),
            label: self.label.take(),
            _category: PhantomData,
        }
    }

    pub fn category() -> &'static str {
        C::NAME
    }
}

impl Key<Symmetric> {
    /// Generate a random symmetric key of `size_bits` bits.
    pub fn generate(size_bits: u32) -> Result<Self> {
        let len = byte_len(size_bits)?;
        let mut buffer = SecureBuffer::with_len(len);
        rand::rng().fill_bytes(buffer.as_mut_bytes());
        Ok(Self::new(buffer, Some("generated".into())))
    }

    /// Derive a symmetric key from a passphrase.
    ///
    /// The first block is `SHA-256(passphrase)`; each further block is
    /// the SHA-256 of the previous block.  Blocks are concatenated and
    /// truncated to exactly `size_bits / 8` bytes, so the same
    /// passphrase and size always give the same key.
    pub fn import_from_passphrase(passphrase: &[u8], size_bits: u32) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(VaultError::InvalidArgument(
                "passphrase must not be empty".into(),
            ));
        }
        let len = byte_len(size_bits)?;

        let mut buffer = SecureBuffer::with_len(len);
        let mut block = Sha256::digest(passphrase);
        let mut filled = 0;
        loop {
            let n = block.len().min(len - filled);
            buffer.as_mut_bytes()[filled..filled + n].copy_from_slice(&block[..n]);
            filled += n;
            if filled == len {
                break;
            }
            block = Sha256::digest(block);
        }
        block.as_mut_slice().fill(0);

        Ok(Self::new(buffer, Some("passphrase".into())))
    }

    /// Decode the base64 `key` field of a metadata object.
    pub fn import_from_encoded_metadata(metadata: &Value) -> Result<Self> {
        let buffer = metadata::decode_key_field(metadata)?;
        Ok(Self::new(buffer, Some("metadata".into())))
    }

    /// Parse metadata text (JSON object or bare base64) into a key.
    pub fn import_from_metadata_text(text: &str) -> Result<Self> {
        let buffer = metadata::parse_key_metadata(text)?;
        Ok(Self::new(buffer, Some("metadata".into())))
    }
}

fn byte_len(size_bits: u32) -> Result<usize> {
    if size_bits == 0 || size_bits % 8 != 0 {
        return Err(VaultError::InvalidArgument(format!(
            "key size must be a positive multiple of 8 bits (got {size_bits})"
        )));
    }
    Ok((size_bits / 8) as usize)
}

impl<C: KeyCategory> fmt::Display for Key<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key<{}> size={} bits", C::NAME, self.size_bits())?;
        if let Some(label) = &self.label {
            write!(f, " label={label}")?;
        }
        Ok(())
    }
}

impl<C: KeyCategory> fmt::Debug for Key<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("category", &C::NAME)
            .field("len", &self.len())
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn generate_produces_requested_size() {
        let key = Key::<Symmetric>::generate(128).unwrap();
        assert_eq!(key.len(), 16);
        assert_eq!(key.size_bits(), 128);
        assert_eq!(key.label(), Some("generated"));
    }

    #[test]
    fn generate_rejects_bad_sizes() {
        assert!(matches!(
            Key::<Symmetric>::generate(0),
            Err(VaultError::InvalidArgument(_))
        ));
        assert!(matches!(
            Key::<Symmetric>::generate(100),
            Err(VaultError::InvalidArgument(_))
        ));
    }

    #[test]
    fn generated_keys_differ() {
        let a = Key::<Symmetric>::generate(256).unwrap();
        let b = Key::<Symmetric>::generate(256).unwrap();
        assert_ne!(a.raw(), b.raw());
    }

    #[test]
    fn passphrase_derivation_matches_sha256() {
        let key = Key::<Symmetric>::import_from_passphrase(b"hunter2", 256).unwrap();
        assert_eq!(key.raw(), Sha256::digest(b"hunter2").as_slice());
        assert_eq!(key.label(), Some("passphrase"));
    }

    #[test]
    fn passphrase_derivation_truncates() {
        let full = Key::<Symmetric>::import_from_passphrase(b"pw", 256).unwrap();
        let short = Key::<Symmetric>::import_from_passphrase(b"pw", 128).unwrap();
        assert_eq!(short.raw(), &full.raw()[..16]);
    }

    #[test]
    fn passphrase_derivation_extends_past_one_digest() {
        let key = Key::<Symmetric>::import_from_passphrase(b"pw", 512).unwrap();
        let first = Sha256::digest(b"pw");
        let second = Sha256::digest(first);
        assert_eq!(key.len(), 64);
        assert_eq!(&key.raw()[..32], first.as_slice());
        assert_eq!(&key.raw()[32..], second.as_slice());
    }

    #[test]
    fn passphrase_rejects_empty() {
        assert!(matches!(
            Key::<Symmetric>::import_from_passphrase(b"", 256),
            Err(VaultError::InvalidArgument(_))
        ));
    }

    #[test]
    fn import_from_file_reads_raw_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("k.bin");
        fs::write(&path, [9u8, 8, 7]).unwrap();

        let key = Key::<Symmetric>::import_from_file(&path).unwrap();
        assert_eq!(key.raw(), &[9, 8, 7]);
        assert_eq!(key.label(), Some(format!("file:{}", path.display()).as_str()));
    }

    #[test]
    fn import_from_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = Key::<Asymmetric>::import_from_file(&dir.path().join("missing"));
        assert!(matches!(result, Err(VaultError::Io { .. })));
    }

    #[test]
    fn import_from_encoded_metadata_decodes_key() {
        let meta = serde_json::json!({ "key": "AQID" });
        let key = Key::<Symmetric>::import_from_encoded_metadata(&meta).unwrap();
        assert_eq!(key.raw(), &[1, 2, 3]);
        assert_eq!(key.label(), Some("metadata"));
    }

    #[test]
    fn import_from_encoded_metadata_requires_key_field() {
        let meta = serde_json::json!({ "other": "AQID" });
        assert!(matches!(
            Key::<Symmetric>::import_from_encoded_metadata(&meta),
            Err(VaultError::InvalidArgument(_))
        ));
    }

    #[test]
    fn materialize_is_independent_copy() {
        let mut key = Key::<Symmetric>::new(SecureBuffer::from_slice(b"abcd"), None);
        let copy = key.materialize();
        key.wipe();
        assert!(key.is_wiped());
        assert_eq!(copy.as_bytes(), b"abcd");
    }

    #[test]
    fn take_leaves_source_wiped() {
        let mut key = Key::<Symmetric>::generate(128).unwrap();
        let moved = key.take();
        assert_eq!(moved.len(), 16);
        assert!(key.is_wiped());
        assert_eq!(key.len(), 0);
        assert_eq!(key.label(), None);
    }

    #[test]
    fn display_never_shows_bytes() {
        let key = Key::<Symmetric>::new(SecureBuffer::from_slice(b"\x01\x02"), Some("demo".into()));
        assert_eq!(key.to_string(), "Key<symmetric> size=16 bits label=demo");
        let debug = format!("{key:?}");
        assert!(debug.contains("symmetric"));
        assert!(!debug.contains("[1, 2]"));
    }
}
