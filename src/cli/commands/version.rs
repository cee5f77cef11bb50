//! `plugvault version` — display version and plugin ABI information.

use console::style;

use crate::driver::plugin::{core_version, PLUGIN_ABI_VERSION};
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    println!("plugvault {}", core_version());
    println!(
        "{} {}",
        style("Driver plugin ABI:").dim(),
        style(PLUGIN_ABI_VERSION).cyan()
    );
    Ok(())
}
