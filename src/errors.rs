use std::path::{Path, PathBuf};

use thiserror::Error;

/// All errors that can occur in PlugVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Input errors ---
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // --- IO errors ---
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // --- Driver errors ---
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Cipher error: {0}")]
    Cipher(String),

    #[error("Failed to load plugin {}: {reason}", .path.display())]
    PluginLoad { path: PathBuf, reason: String },

    #[error("No cipher driver matches '{0}'")]
    DriverNotFound(String),

    // --- Ledger errors ---
    #[error("Vault entry #{0} not found")]
    EntryNotFound(usize),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultError {
    /// Wrap an IO error with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build an IO error for a path-level failure that has no OS error behind it.
    pub fn io_other(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Io {
            context: context.into(),
            source: std::io::Error::other(reason.into()),
        }
    }

    pub fn plugin_load(path: &Path, reason: impl Into<String>) -> Self {
        Self::PluginLoad {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for PlugVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
