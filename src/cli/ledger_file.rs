//! `ledger.json`: the CLI's persisted copy of the vault ledger.
//!
//! The ledger itself lives in memory; the CLI replays this file into it
//! on startup and rewrites it (atomically, through [`Storage`]) after
//! every change.
//!
//! [`Storage`]: crate::vault::Storage

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};
use crate::vault::{VaultEntry, VaultLedger};

/// File name inside the storage directory.
pub const LEDGER_FILE: &str = "ledger.json";

/// Current on-disk format version.
pub const LEDGER_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    version: u8,
    #[serde(default)]
    entries: Vec<VaultEntry>,
}

/// Path of the ledger file for `ledger`.
pub fn ledger_path(ledger: &VaultLedger) -> PathBuf {
    ledger.storage_directory().join(LEDGER_FILE)
}

/// Append every entry in `ledger.json` to `ledger`.  A missing file is an
/// empty vault.  Returns the number of entries loaded.
pub fn load_into(ledger: &mut VaultLedger) -> Result<usize> {
    let path = ledger_path(ledger);
    if !path.exists() {
        return Ok(0);
    }

    let bytes = ledger.storage().load(&path)?;
    let file: LedgerFile = serde_json::from_slice(&bytes).map_err(|e| {
        VaultError::SerializationError(format!("parse {}: {e}", path.display()))
    })?;

    if file.version != LEDGER_VERSION {
        return Err(VaultError::SerializationError(format!(
            "unsupported ledger version {} in {}",
            file.version,
            path.display()
        )));
    }

    let count = file.entries.len();
    for entry in file.entries {
        ledger.add_entry(entry);
    }
    Ok(count)
}

/// Rewrite `ledger.json` from the ledger's current entries.
pub fn save(ledger: &VaultLedger) -> Result<()> {
    let file = LedgerFile {
        version: LEDGER_VERSION,
        entries: ledger.entries().to_vec(),
    };
    let json = serde_json::to_vec_pretty(&file)
        .map_err(|e| VaultError::SerializationError(format!("serialize ledger: {e}")))?;

    ledger.storage().store(&ledger_path(ledger), &json)
}
