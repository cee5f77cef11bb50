//! A cipher driver bound for repeated use with typed keys.

use super::CipherDriver;
use crate::crypto::{Key, KeyCategory};
use crate::errors::Result;

/// Borrows one driver and runs it with keys of any category.
///
/// `D` may be a concrete driver type or `dyn CipherDriver`.
pub struct CipherEngine<'a, D: CipherDriver + ?Sized> {
    driver: &'a D,
}

impl<'a, D: CipherDriver + ?Sized> CipherEngine<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self { driver }
    }

    pub fn encrypt_with<C: KeyCategory>(&self, plaintext: &[u8], key: &Key<C>) -> Result<Vec<u8>> {
        self.driver.encrypt(plaintext, key.raw())
    }

    pub fn decrypt_with<C: KeyCategory>(&self, ciphertext: &[u8], key: &Key<C>) -> Result<Vec<u8>> {
        self.driver.decrypt(ciphertext, key.raw())
    }

    pub fn driver(&self) -> &'a D {
        self.driver
    }
}
