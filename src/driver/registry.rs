//! Plugin discovery and ownership of loaded cipher drivers.
//!
//! `DriverRegistry::discover` scans an ordered list of directories for
//! dynamic libraries, loads each through a [`DriverLoader`], and keeps
//! the drivers that load cleanly.  A bad plugin is logged and skipped;
//! discovery itself never fails.

use std::ffi::CStr;
use std::fs;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tracing::{debug, info, warn};

use super::plugin::{
    self, AbiVersionFn, CoreVersionFn, CreateFn, ABI_VERSION_SYMBOL, CORE_VERSION_SYMBOL,
    CREATE_SYMBOL, PLUGIN_ABI_VERSION,
};
use super::CipherDriver;
use crate::errors::{Result, VaultError};

/// A driver together with whatever keeps its code mapped.
pub struct LoadedDriver {
    // Field order matters: the driver's vtable lives inside the library,
    // so the driver must be dropped before the library is unloaded.
    driver: Box<dyn CipherDriver>,
    source: Option<PathBuf>,
    _library: Option<Library>,
}

impl LoadedDriver {
    /// A driver compiled into the current process.
    pub fn in_process(driver: Box<dyn CipherDriver>, source: Option<PathBuf>) -> Self {
        Self {
            driver,
            source,
            _library: None,
        }
    }

    pub fn driver(&self) -> &dyn CipherDriver {
        self.driver.as_ref()
    }

    /// The library file this driver was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Turns a library file into a driver.
pub trait DriverLoader {
    /// Whether `path` looks like a loadable dynamic library.
    fn is_library(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(std::env::consts::DLL_EXTENSION))
    }

    /// Load the library at `path` and obtain its driver.
    ///
    /// Errors should be [`VaultError::PluginLoad`].
    fn load(&self, path: &Path) -> Result<LoadedDriver>;
}

/// Loads plugins built with [`export_cipher_driver!`](crate::export_cipher_driver).
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryLoader;

impl DriverLoader for LibraryLoader {
    fn load(&self, path: &Path) -> Result<LoadedDriver> {
        // SAFETY: loading a library runs its initialisers.  Plugins are
        // trusted code found in directories the operator configured.
        let library = unsafe { Library::new(path) }
            .map_err(|e| VaultError::plugin_load(path, format!("failed to load library: {e}")))?;

        check_abi(&library, path)?;

        let raw = {
            // SAFETY: the ABI check above guarantees the symbol has the
            // `CreateFn` signature.
            let create: Symbol<CreateFn> = unsafe { library.get(CREATE_SYMBOL) }.map_err(|_| {
                VaultError::plugin_load(path, "does not implement CipherDriver (no create entry point)")
            })?;
            // SAFETY: `create` takes no arguments and returns an owned pointer.
            unsafe { create() }
        };

        if raw.is_null() {
            return Err(VaultError::plugin_load(path, "plugin instance is null"));
        }

        // SAFETY: a non-null pointer from `plugvault_driver_create` comes
        // from `Box::into_raw` and ownership passes to us exactly once.
        let driver = unsafe { *Box::from_raw(raw) };

        Ok(LoadedDriver {
            driver,
            source: Some(path.to_path_buf()),
            _library: Some(library),
        })
    }
}

fn check_abi(library: &Library, path: &Path) -> Result<()> {
    // SAFETY: the symbol is looked up by the name the export macro uses,
    // with the signature the macro generates.
    let abi_version: Symbol<AbiVersionFn> = unsafe { library.get(ABI_VERSION_SYMBOL) }
        .map_err(|_| VaultError::plugin_load(path, "does not implement CipherDriver"))?;
    // SAFETY: see above; the function takes no arguments.
    let abi = unsafe { abi_version() };
    if abi != PLUGIN_ABI_VERSION {
        return Err(VaultError::plugin_load(
            path,
            format!("plugin ABI version {abi}, expected {PLUGIN_ABI_VERSION}"),
        ));
    }

    // SAFETY: as above.
    let core_version: Symbol<CoreVersionFn> = unsafe { library.get(CORE_VERSION_SYMBOL) }
        .map_err(|_| VaultError::plugin_load(path, "does not report its core version"))?;
    // SAFETY: the macro returns a pointer to a NUL-terminated static string.
    let reported = unsafe {
        let ptr = core_version();
        if ptr.is_null() {
            return Err(VaultError::plugin_load(path, "core version is null"));
        }
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    };
    if reported != plugin::core_version() {
        return Err(VaultError::plugin_load(
            path,
            format!(
                "built against plugvault {reported}, host is {}",
                plugin::core_version()
            ),
        ));
    }

    Ok(())
}

/// Owns every driver loaded by the most recent [`discover`](Self::discover).
pub struct DriverRegistry {
    loader: Box<dyn DriverLoader>,
    loaded: Vec<LoadedDriver>,
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverRegistry {
    /// An empty registry that loads plugins with [`LibraryLoader`].
    pub fn new() -> Self {
        Self::with_loader(Box::new(LibraryLoader))
    }

    pub fn with_loader(loader: Box<dyn DriverLoader>) -> Self {
        Self {
            loader,
            loaded: Vec::new(),
        }
    }

    /// Scan `search_paths` in order and replace the held drivers.
    ///
    /// Within a directory, files are visited in name order.  Missing
    /// directories are skipped; plugins that fail to load are logged
    /// and skipped.
    pub fn discover<P: AsRef<Path>>(&mut self, search_paths: &[P]) {
        // Unload the previous generation before loading the next.
        self.loaded.clear();

        for dir in search_paths {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "plugin directory does not exist");
                continue;
            }

            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), %e, "failed to read plugin directory");
                    continue;
                }
            };

            let mut files: Vec<PathBuf> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect();
            files.sort();

            for path in files {
                if !self.loader.is_library(&path) {
                    continue;
                }
                match self.loader.load(&path) {
                    Ok(loaded) => {
                        info!(
                            plugin = %path.display(),
                            name = loaded.driver().name(),
                            version = loaded.driver().version(),
                            "loaded cipher driver"
                        );
                        self.loaded.push(loaded);
                    }
                    Err(e) => warn!(plugin = %path.display(), %e, "skipping plugin"),
                }
            }
        }
    }

    /// Drivers in discovery order.
    pub fn drivers(&self) -> Vec<&dyn CipherDriver> {
        self.loaded.iter().map(LoadedDriver::driver).collect()
    }

    /// Drivers with the library each one came from.
    pub fn loaded(&self) -> &[LoadedDriver] {
        &self.loaded
    }

    /// The driver at `index` in discovery order.
    pub fn get(&self, index: usize) -> Result<&dyn CipherDriver> {
        self.loaded
            .get(index)
            .map(LoadedDriver::driver)
            .ok_or_else(|| {
                VaultError::InvalidArgument(format!(
                    "no cipher driver at index {index} ({} loaded)",
                    self.loaded.len()
                ))
            })
    }

    /// The first driver whose name matches `name` exactly.
    pub fn find(&self, name: &str) -> Result<&dyn CipherDriver> {
        self.loaded
            .iter()
            .map(LoadedDriver::driver)
            .find(|driver| driver.name() == name)
            .ok_or_else(|| VaultError::DriverNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}
