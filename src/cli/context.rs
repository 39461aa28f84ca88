use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::core::errors::{LogManagerError, Result};

/// Default configuration directory, relative to the working directory.
pub const DEFAULT_DIR: &str = ".log-manager";

static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the global configuration directory path.
/// If `custom` is provided, uses that path; otherwise defaults to `.log-manager`.
pub fn init(custom: Option<&str>) {
    let dir = custom
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));
    let _ = CONFIG_DIR.set(dir);
}

/// Get the current configuration directory path.
pub fn config_dir() -> &'static Path {
    CONFIG_DIR
        .get()
        .map(|p| p.as_path())
        .unwrap_or(Path::new(DEFAULT_DIR))
}

/// Fail with a hint when `init` has not been run.
pub fn require_initialized() -> Result<&'static Path> {
    let dir = config_dir();
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(LogManagerError::InvalidConfig {
            detail: format!(
                "{} not found. Run 'log-manager init' first.",
                dir.display()
            ),
        })
    }
}
