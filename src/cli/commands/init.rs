use crate::adapters::audit::sqlite_sink::SqliteSink;
use crate::cli::context;
use crate::cli::output;
use crate::config::app_config::{AppConfig, CONFIG_FILE_NAME};
use crate::core::errors::{LogManagerError, Result};

/// Execute the `log-manager init` command.
///
/// Creates the configuration directory with a default `config.toml` and the
/// database table, so either backend can take writes immediately.
pub fn execute(verbose: bool) -> Result<()> {
    let dir = context::config_dir();

    if dir.join(CONFIG_FILE_NAME).exists() {
        return Err(LogManagerError::InvalidConfig {
            detail: format!("already initialized ({} exists)", dir.display()),
        });
    }

    output::header("log-manager: initializing");

    std::fs::create_dir_all(dir)?;
    output::success(&format!("Created {}/", dir.display()));

    let config = AppConfig::default();
    std::fs::write(dir.join(CONFIG_FILE_NAME), config.to_toml()?)?;
    output::success("Generated config.toml with defaults");

    let database = config.database_path(dir);
    let sink = SqliteSink::new(&database, &config.storage.table_prefix)?;
    sink.initialize()?;
    output::success(&format!(
        "Database ready: {} (table {})",
        database.display(),
        sink.table()
    ));

    if verbose {
        println!();
        println!("  Storage backend: {}", config.backend().as_str());
        println!("  Clock offset:    {}", config.clock.utc_offset);
        println!("  Switch to the text log with [storage] backend = \"file\".");
    }

    Ok(())
}
