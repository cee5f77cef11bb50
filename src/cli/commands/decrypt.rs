//! `plugvault decrypt` — decrypt a vault entry back to a file.

use std::path::{Path, PathBuf};

use crate::cli::{load_key, output, select_driver, Context, KeySource};
use crate::errors::{Result, VaultError};

/// Execute the `decrypt` command.
///
/// `entry` is the 1-based number shown by `plugvault list`.  Without
/// `--driver` the driver named in the entry's algorithm is used.  An
/// existing output file is only replaced with `force`.
pub fn execute(
    ctx: &Context,
    entry: usize,
    driver: Option<&str>,
    output_path: Option<&str>,
    force: bool,
    key_source: &KeySource,
) -> Result<()> {
    let index = entry
        .checked_sub(1)
        .ok_or_else(|| VaultError::InvalidArgument("entry numbers start at 1".into()))?;

    let ledger = ctx.open_ledger()?;
    let record = ledger.entry(index)?;

    let target = match output_path {
        Some(path) => ctx.project_dir.join(path),
        None => default_output(ctx, &record.original_path)?,
    };
    if target.exists() && !force {
        return Err(VaultError::CommandFailed(format!(
            "{} already exists (use --force to overwrite, or --output)",
            target.display()
        )));
    }

    let key = load_key(key_source, ctx.settings.default_key_bits)?;

    let registry = ctx.discover_drivers();
    let driver = select_driver(&registry, driver.unwrap_or(&record.algorithm))?;
    if driver.name() != record.algorithm {
        output::warning(&format!(
            "entry #{entry} was encrypted with '{}', decrypting with '{}'",
            record.algorithm,
            driver.name()
        ));
    }

    let plaintext = ledger.decrypt_entry(driver, index, &key)?;
    ledger.storage().store(&target, &plaintext)?;

    output::success(&format!(
        "Decrypted entry #{entry} with {} to {}",
        driver.name(),
        target.display()
    ));

    Ok(())
}

/// The original file name, placed in the current project directory.
fn default_output(ctx: &Context, original: &Path) -> Result<PathBuf> {
    let name = original.file_name().ok_or_else(|| {
        VaultError::InvalidArgument(format!(
            "{} has no file name; pass --output",
            original.display()
        ))
    })?;
    Ok(ctx.project_dir.join(name))
}
