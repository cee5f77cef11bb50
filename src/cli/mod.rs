//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod ledger_file;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::{Key, Symmetric};
use crate::driver::{CipherDriver, DriverRegistry};
use crate::errors::{Result, VaultError};
use crate::vault::VaultLedger;

/// Environment variable consulted before prompting for a passphrase.
pub const PASSPHRASE_ENV: &str = "PLUGVAULT_PASSPHRASE";

/// PlugVault CLI: file vault with pluggable cipher drivers.
#[derive(Parser, Debug)]
#[command(
    name = "plugvault",
    about = "File vault with pluggable cipher drivers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory where encrypted artifacts are stored (default: from .plugvault.toml)
    #[arg(long, global = true)]
    pub storage_dir: Option<String>,

    /// Plugin directory to search; repeat for several (replaces the default search list)
    #[arg(long = "plugin-path", global = true)]
    pub plugin_paths: Vec<String>,

    /// Log filter used when RUST_LOG is not set (e.g. warn, info, debug)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List the cipher drivers found in the plugin search paths
    Drivers,

    /// Generate a random symmetric key file
    Keygen {
        /// Where to write the key
        #[arg(short, long)]
        out: String,
        /// Key size in bits (default: from config, 256)
        #[arg(long)]
        bits: Option<u32>,
        /// Overwrite an existing key file
        #[arg(short, long)]
        force: bool,
    },

    /// Encrypt a file into the vault
    Encrypt {
        /// File to encrypt
        file: String,
        /// Driver name, or its number from `plugvault drivers`
        #[arg(short, long)]
        driver: String,
        #[command(flatten)]
        key: KeySource,
    },

    /// Decrypt a vault entry
    Decrypt {
        /// Entry number from `plugvault list`
        entry: usize,
        /// Driver name or number (default: the algorithm recorded in the entry)
        #[arg(short, long)]
        driver: Option<String>,
        /// Output file (default: original file name in the current directory)
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,
        #[command(flatten)]
        key: KeySource,
    },

    /// List vault entries
    List,

    /// Show version information
    Version,
}

/// Where the symmetric key comes from.  Exactly one source must be given.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct KeySource {
    /// Read raw key bytes from a file
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<String>,

    /// Derive the key from a passphrase (prompted, or PLUGVAULT_PASSPHRASE)
    #[arg(long)]
    pub passphrase: bool,

    /// Key metadata: {"key":"<base64>"} or bare base64
    #[arg(long, value_name = "TEXT")]
    pub key_metadata: Option<String>,

    /// Size of a passphrase-derived key in bits (default: from config, 256)
    #[arg(long, value_name = "BITS")]
    pub key_bits: Option<u32>,
}

// ---------------------------------------------------------------------------
// Shared context used by every command
// ---------------------------------------------------------------------------

/// Settings resolved from `.plugvault.toml` and global CLI flags.
#[derive(Debug, Clone)]
pub struct Context {
    pub project_dir: PathBuf,
    pub settings: Settings,
    pub storage_dir: PathBuf,
    pub plugin_paths: Vec<PathBuf>,
    pub log_level: String,
}

impl Context {
    /// Resolve the context for the current working directory.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| VaultError::io("cannot determine current directory", e))?;
        Self::resolve(cli, &cwd)
    }

    /// Resolve the context for `project_dir`.
    ///
    /// `--storage-dir` and `--log-level` override the config file;
    /// `--plugin-path` replaces the default plugin search list.
    pub fn resolve(cli: &Cli, project_dir: &Path) -> Result<Self> {
        let settings = Settings::load(project_dir)?;

        let storage_dir = match &cli.storage_dir {
            Some(dir) => project_dir.join(dir),
            None => settings.storage_path(project_dir),
        };

        let plugin_paths = if cli.plugin_paths.is_empty() {
            settings.plugin_search_paths(project_dir)
        } else {
            cli.plugin_paths
                .iter()
                .map(|p| project_dir.join(p))
                .collect()
        };

        let log_level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| settings.log_level.clone());

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            settings,
            storage_dir,
            plugin_paths,
            log_level,
        })
    }

    /// Discover cipher drivers in the configured search paths.
    pub fn discover_drivers(&self) -> DriverRegistry {
        let mut registry = DriverRegistry::new();
        registry.discover(&self.plugin_paths);
        registry
    }

    /// Open the ledger for the storage directory, replaying `ledger.json`.
    pub fn open_ledger(&self) -> Result<VaultLedger> {
        let mut ledger = VaultLedger::new(&self.storage_dir)?;
        ledger_file::load_into(&mut ledger)?;
        Ok(ledger)
    }
}

/// Initialise tracing on stderr.  `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Pick a driver by its 1-based number or by exact name.
pub fn select_driver<'r>(registry: &'r DriverRegistry, selector: &str) -> Result<&'r dyn CipherDriver> {
    if registry.is_empty() {
        return Err(VaultError::CommandFailed(
            "no cipher drivers found; check the plugin search paths with `plugvault drivers`"
                .into(),
        ));
    }
    match selector.parse::<usize>() {
        Ok(0) => Err(VaultError::InvalidArgument(
            "driver numbers start at 1".into(),
        )),
        Ok(number) => registry.get(number - 1),
        Err(_) => registry.find(selector),
    }
}

/// Build the symmetric key described by `source`.
pub fn load_key(source: &KeySource, default_bits: u32) -> Result<Key<Symmetric>> {
    let given = usize::from(source.key_file.is_some())
        + usize::from(source.passphrase)
        + usize::from(source.key_metadata.is_some());
    if given != 1 {
        return Err(VaultError::InvalidArgument(
            "specify exactly one of --key-file, --passphrase, --key-metadata".into(),
        ));
    }

    if let Some(path) = &source.key_file {
        return Key::import_from_file(Path::new(path));
    }
    if let Some(text) = &source.key_metadata {
        return Key::import_from_metadata_text(text);
    }

    let passphrase = prompt_passphrase()?;
    Key::import_from_passphrase(
        passphrase.as_bytes(),
        source.key_bits.unwrap_or(default_bits),
    )
}

/// Get the passphrase, trying in order:
/// 1. `PLUGVAULT_PASSPHRASE` env var
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_passphrase() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter passphrase")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}
