use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::adapters::audit::sqlite_sink::validate_table_prefix;
use crate::core::errors::{LogManagerError, Result};
use crate::core::traits::settings::StorageBackend;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration read from `.log-manager/config.toml`.
///
/// Every section is optional; missing keys take the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSection,
    pub clock: ClockSection,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Load and validate `<config_dir>/config.toml`.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(LogManagerError::InvalidConfig {
                detail: "config.toml not found. Run 'log-manager init' first.".into(),
            });
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Like [`AppConfig::load`], but a missing or broken file yields defaults.
    pub fn load_or_default(config_dir: &Path) -> Self {
        match Self::load(config_dir) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| LogManagerError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would be unsafe or unusable at runtime.
    pub fn validate(&self) -> Result<()> {
        validate_table_prefix(&self.storage.table_prefix)?;
        self.utc_offset()?;
        Ok(())
    }

    /// Render as TOML, for `init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LogManagerError::Serialization {
            detail: format!("Failed to render config.toml: {e}"),
        })
    }

    pub fn backend(&self) -> StorageBackend {
        StorageBackend::from_setting(&self.storage.backend)
    }

    /// Parsed `[clock] utc_offset`.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        parse_utc_offset(&self.clock.utc_offset)
    }

    /// Directory for the text log, relative paths resolved against
    /// `config_dir`. `None` when unset.
    pub fn file_directory(&self, config_dir: &Path) -> Option<PathBuf> {
        let raw = self.storage.file_path.trim();
        (!raw.is_empty()).then(|| resolve(config_dir, raw))
    }

    /// SQLite database file, relative paths resolved against `config_dir`.
    pub fn database_path(&self, config_dir: &Path) -> PathBuf {
        resolve(config_dir, &self.storage.database)
    }
}

fn resolve(base: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Parse `+HH:MM` / `-HH:MM`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let invalid = || LogManagerError::InvalidConfig {
        detail: format!("utc_offset '{raw}' must look like +05:30 or -08:00"),
    };

    let raw = raw.trim();
    let (sign, rest) = match raw.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// The `[storage]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSection {
    /// `database` or `file`. Anything else is treated as `database`.
    pub backend: String,
    pub file_path: String,
    pub database: String,
    pub table_prefix: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Database.as_str().into(),
            file_path: "logs".into(),
            database: "log-manager.db".into(),
            table_prefix: "wp_".into(),
        }
    }
}

/// The `[clock]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClockSection {
    pub utc_offset: String,
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            utc_offset: "+05:30".into(),
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}
