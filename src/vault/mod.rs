//! Vault module — encrypted artifact storage and its ledger.
//!
//! This module provides:
//! - The `VaultEntry` record (`entry`)
//! - Atomic file persistence (`storage`)
//! - `VaultLedger`, which encrypts, stores and records artifacts (`ledger`)

pub mod entry;
pub mod ledger;
pub mod storage;

// Re-export the most commonly used items.
pub use entry::VaultEntry;
pub use ledger::{SealedPayload, VaultLedger, ARTIFACT_EXTENSION};
pub use storage::Storage;
