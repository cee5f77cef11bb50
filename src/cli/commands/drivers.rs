//! `plugvault drivers` — list the cipher drivers found on the search path.

use tracing::debug;

use crate::cli::output;
use crate::cli::Context;
use crate::errors::Result;

/// Execute the `drivers` command.
///
/// Libraries that fail to load are skipped (and logged), so this command
/// succeeds even when a plugin directory holds garbage.
pub fn execute(ctx: &Context) -> Result<()> {
    for dir in &ctx.plugin_paths {
        debug!(path = %dir.display(), "plugin search path");
    }

    let registry = ctx.discover_drivers();
    output::info(&format!("{} cipher driver(s) loaded", registry.len()));
    output::print_drivers_table(registry.loaded());

    Ok(())
}
