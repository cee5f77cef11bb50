//! Cipher drivers: the capability contract, plugin loading, and the registry.
//!
//! This module provides:
//! - The `CipherDriver` trait every cipher implementation satisfies
//! - `CipherEngine`, a driver bound to one call site (`engine`)
//! - The C-ABI entry points shared with plugin libraries (`plugin`)
//! - `DriverRegistry`, which discovers and owns loaded drivers (`registry`)
//! - `XorDriver`, the placeholder cipher shipped as a plugin (`xor`)

pub mod engine;
pub mod plugin;
pub mod registry;
pub mod xor;

pub use engine::CipherEngine;
pub use registry::{DriverLoader, DriverRegistry, LibraryLoader, LoadedDriver};
pub use xor::XorDriver;

use crate::errors::{Result, VaultError};

/// Size of the nonce that drivers following the prefix convention put in
/// front of their ciphertext.
pub const NONCE_PREFIX_LEN: usize = 12;

/// The contract every pluggable cipher implementation satisfies.
///
/// Drivers are stateless with respect to vault data: key and input are
/// passed on every call and must not be retained afterwards.
pub trait CipherDriver: Send + Sync {
    /// Encrypt `plaintext` with raw key bytes.
    fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt output of [`encrypt`](Self::encrypt).
    ///
    /// `decrypt(encrypt(p, k), k)` must return exactly `p`.
    fn decrypt(&self, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>>;

    /// Encrypt with a key addressed by an opaque metadata string.
    fn encrypt_with_metadata(&self, plaintext: &[u8], key_metadata: &str) -> Result<Vec<u8>> {
        let _ = (plaintext, key_metadata);
        Err(VaultError::NotImplemented(format!(
            "encrypt with key metadata is not supported by driver '{}'",
            self.name()
        )))
    }

    /// Decrypt with a key addressed by an opaque metadata string.
    fn decrypt_with_metadata(&self, ciphertext: &[u8], key_metadata: &str) -> Result<Vec<u8>> {
        let _ = (ciphertext, key_metadata);
        Err(VaultError::NotImplemented(format!(
            "decrypt with key metadata is not supported by driver '{}'",
            self.name()
        )))
    }

    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Whether the ciphertext starts with a [`NONCE_PREFIX_LEN`]-byte nonce.
    fn prefixes_nonce(&self) -> bool {
        false
    }
}
