//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::driver::LoadedDriver;
use crate::vault::VaultEntry;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of vault entries (#, Original, Stored, Algorithm, Nonce, Encrypted).
pub fn print_entries_table(entries: &[VaultEntry]) {
    if entries.is_empty() {
        info("No files in this vault yet.");
        tip("Run `plugvault encrypt <FILE> --driver <NAME> --key-file <PATH>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "#",
        "Original",
        "Stored",
        "Algorithm",
        "Nonce",
        "Encrypted",
    ]);

    for (i, e) in entries.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            e.original_path.display().to_string(),
            e.stored_path.display().to_string(),
            e.algorithm.clone(),
            if e.nonce.is_empty() {
                "-".to_string()
            } else {
                BASE64.encode(&e.nonce)
            },
            e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print a table of loaded drivers (#, Name, Version, Library).
pub fn print_drivers_table(drivers: &[LoadedDriver]) {
    if drivers.is_empty() {
        info("No cipher drivers found.");
        tip("Place driver libraries in a plugin directory or pass `--plugin-path <DIR>`.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Name", "Version", "Library"]);

    for (i, d) in drivers.iter().enumerate() {
        let source = d
            .source()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(built-in)".to_string());
        table.add_row(vec![
            (i + 1).to_string(),
            d.driver().name().to_string(),
            d.driver().version().to_string(),
            source,
        ]);
    }

    println!("{table}");
}
