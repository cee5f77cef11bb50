//! `plugvault keygen` — generate a random symmetric key file.

use crate::cli::output;
use crate::cli::Context;
use crate::crypto::{Key, Symmetric};
use crate::errors::{Result, VaultError};

/// Execute the `keygen` command.
pub fn execute(ctx: &Context, out: &str, bits: Option<u32>, force: bool) -> Result<()> {
    let path = ctx.project_dir.join(out);

    if path.exists() {
        if !force {
            return Err(VaultError::CommandFailed(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        output::warning(&format!("Overwriting existing key file {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            VaultError::io(format!("failed to create {}", parent.display()), e)
        })?;
    }

    let key = Key::<Symmetric>::generate(bits.unwrap_or(ctx.settings.default_key_bits))?;
    crate::vault::Storage::new().store_private(&path, key.raw())?;

    output::success(&format!(
        "Wrote {}-bit key to {}",
        key.size_bits(),
        path.display()
    ));
    output::tip("Keep this file out of version control.");

    Ok(())
}
