use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::DEFAULT_KEY_BITS;
use crate::errors::{Result, VaultError};

/// Project-level configuration, loaded from `.plugvault.toml`.
///
/// Every field has a sensible default so PlugVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) where vault artifacts are stored.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// Extra directories searched for cipher driver plugins, after the
    /// built-in locations.
    #[serde(default)]
    pub plugin_paths: Vec<String>,

    /// Key size used by `keygen` and passphrase derivation (default: 256).
    #[serde(default = "default_key_bits")]
    pub default_key_bits: u32,

    /// Log filter used when `RUST_LOG` is not set (default: "warn").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_storage_dir() -> String {
    ".plugvault/vault".to_string()
}

fn default_key_bits() -> u32 {
    DEFAULT_KEY_BITS
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            plugin_paths: Vec::new(),
            default_key_bits: default_key_bits(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".plugvault.toml";

    /// Load settings from `<project_dir>/.plugvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            VaultError::io(format!("failed to read {}", config_path.display()), e)
        })?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path of the storage directory.
    ///
    /// Example: `project_dir/.plugvault/vault`
    pub fn storage_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.storage_dir)
    }

    /// Ordered plugin search paths:
    ///
    /// 1. `plugins/` next to the running executable
    /// 2. `<project_dir>/.plugvault/plugins`
    /// 3. each entry of `plugin_paths`, relative to the project root
    pub fn plugin_search_paths(&self, project_dir: &Path) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(self.plugin_paths.len() + 2);

        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            paths.push(exe_dir.join("plugins"));
        }
        paths.push(project_dir.join(".plugvault").join("plugins"));
        paths.extend(self.plugin_paths.iter().map(|p| project_dir.join(p)));

        paths
    }
}

// ── Tests ────────────────────────────────────────────────────────────
