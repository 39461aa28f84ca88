use std::path::Path;

use colored::Colorize;

use crate::adapters::audit::text_file_sink::LOG_FILE_NAME;
use crate::cli::commands::storage::Storage;
use crate::cli::{context, output};
use crate::core::errors::Result;
use crate::core::traits::reader::AuditReader;
use crate::core::traits::settings::StorageBackend;

/// Lines the text sink writes before the first entry.
const HEADER_LINES: usize = 3;

/// Execute the `log-manager status` command.
///
/// Shows the configuration, which backend is active, and how many entries
/// each backend currently holds.
pub fn execute() -> Result<()> {
    let dir = context::require_initialized()?;
    let storage = Storage::open(dir)?;
    let config = &storage.config;
    let backend = config.backend();

    output::header(&format!("log-manager v{}", env!("CARGO_PKG_VERSION")));
    output::field("Config", &dir.join("config.toml").display().to_string());
    output::field("Backend", &backend.as_str().cyan().to_string());
    output::field("Clock", &format!("UTC{}", config.clock.utc_offset));

    print_database(&storage, backend == StorageBackend::Database);
    print_text_file(config.file_directory(dir).as_deref(), backend == StorageBackend::File);

    Ok(())
}

fn active_marker(active: bool) -> String {
    if active {
        "(active)".green().to_string()
    } else {
        String::new()
    }
}

fn print_database(storage: &Storage, active: bool) {
    println!("\n{} {}", "  Database".bold(), active_marker(active));
    let path = storage.database_path();
    output::field("File", &path.display().to_string());
    output::field("Table", storage.database.table());

    if !path.exists() {
        output::warning("Database file does not exist yet");
        return;
    }
    match storage.database.count(None) {
        Ok(rows) => output::success(&format!("{rows} entries")),
        Err(e) => output::warning(&format!("Could not read entries: {e}")),
    }
}

fn print_text_file(directory: Option<&Path>, active: bool) {
    println!("\n{} {}", "  Text file".bold(), active_marker(active));
    let Some(directory) = directory else {
        output::warning("No file_path configured");
        return;
    };

    let path = directory.join(LOG_FILE_NAME);
    output::field("File", &path.display().to_string());
    if !path.exists() {
        println!("  {} no entries yet", "—".dimmed());
        return;
    }

    let content = std::fs::read_to_string(&path).unwrap_or_default();
    output::success(&format!("{} entries", count_rows(&content)));
}

/// Entry rows in a text log, header excluded.
fn count_rows(content: &str) -> usize {
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count()
        .saturating_sub(HEADER_LINES)
}
