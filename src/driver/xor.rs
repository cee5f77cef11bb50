//! Placeholder cipher used to exercise the driver contract.
//!
//! **Not secure.**  Each byte is XORed with `key[i % key_len] ^ nonce[i % 12]`.
//! It exists so the registry, ledger and plugin plumbing have a
//! conforming driver to talk to; it provides no confidentiality or
//! integrity worth the name.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | masked body ]

use rand::RngCore;

use super::{CipherDriver, NONCE_PREFIX_LEN};
use crate::crypto::metadata::parse_key_metadata;
use crate::crypto::SecureBuffer;
use crate::errors::{Result, VaultError};

#[derive(Debug, Default, Clone, Copy)]
pub struct XorDriver;

impl XorDriver {
    pub const NAME: &'static str = "xor-placeholder";
    pub const VERSION: &'static str = "0.1.0";

    fn apply_mask(input: &[u8], key: &[u8], nonce: &[u8]) -> Vec<u8> {
        let mut mask = SecureBuffer::with_len(input.len());
        for (i, byte) in mask.as_mut_bytes().iter_mut().enumerate() {
            *byte = key[i % key.len()] ^ nonce[i % nonce.len()];
        }
        input
            .iter()
            .zip(mask.as_bytes())
            .map(|(b, m)| b ^ m)
            .collect()
    }
}

impl CipherDriver for XorDriver {
    fn encrypt(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        if key.is_empty() {
            return Err(VaultError::InvalidArgument("key must not be empty".into()));
        }

        let mut nonce = [0u8; NONCE_PREFIX_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let body = Self::apply_mask(plaintext, key, &nonce);

        let mut output = Vec::with_capacity(NONCE_PREFIX_LEN + body.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&body);
        Ok(output)
    }

    fn decrypt(&self, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_PREFIX_LEN {
            return Err(VaultError::InvalidArgument("ciphertext too short".into()));
        }
        if key.is_empty() {
            return Err(VaultError::InvalidArgument("key must not be empty".into()));
        }

        let (nonce, body) = ciphertext.split_at(NONCE_PREFIX_LEN);
        Ok(Self::apply_mask(body, key, nonce))
    }

    fn encrypt_with_metadata(&self, plaintext: &[u8], key_metadata: &str) -> Result<Vec<u8>> {
        let key = parse_key_metadata(key_metadata)?;
        self.encrypt(plaintext, key.as_bytes())
    }

    fn decrypt_with_metadata(&self, ciphertext: &[u8], key_metadata: &str) -> Result<Vec<u8>> {
        let key = parse_key_metadata(key_metadata)?;
        self.decrypt(ciphertext, key.as_bytes())
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        Self::VERSION
    }

    fn prefixes_nonce(&self) -> bool {
        true
    }
}
