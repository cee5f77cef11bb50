//! `plugvault list` — display all vault entries in a table.

use crate::cli::output;
use crate::cli::Context;
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(ctx: &Context) -> Result<()> {
    let ledger = ctx.open_ledger()?;
    let entries = ledger.entries();

    output::info(&format!(
        "{} file(s) in {}",
        entries.len(),
        ledger.storage_directory().display()
    ));

    output::print_entries_table(entries);

    Ok(())
}
