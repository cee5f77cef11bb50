//! `plugvault encrypt` — encrypt a file into the vault.

use crate::cli::{ledger_file, load_key, output, select_driver, Context, KeySource};
use crate::errors::{Result, VaultError};

/// Execute the `encrypt` command.
pub fn execute(ctx: &Context, file: &str, driver: &str, key_source: &KeySource) -> Result<()> {
    let input = ctx.project_dir.join(file);
    let input = std::fs::canonicalize(&input)
        .map_err(|e| VaultError::io(format!("cannot read {}", input.display()), e))?;

    let key = load_key(key_source, ctx.settings.default_key_bits)?;
    let registry = ctx.discover_drivers();
    let driver = select_driver(&registry, driver)?;

    let mut ledger = ctx.open_ledger()?;
    let entry = ledger.encrypt_file(driver, &input, &key)?.clone();
    ledger_file::save(&ledger)?;

    output::success(&format!(
        "Encrypted {} with {} {} as entry #{}",
        entry.original_path.display(),
        driver.name(),
        driver.version(),
        ledger.entries().len()
    ));
    output::tip(&format!("Stored at {}", entry.stored_path.display()));

    Ok(())
}
