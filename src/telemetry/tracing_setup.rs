//! Tracing subscriber setup.
//!
//! Diagnostics always go to stderr; stdout belongs to command output.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::app_config::LoggingSection;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level used when `RUST_LOG` is not set
    pub level: Level,
    /// Emit one JSON object per event
    pub json: bool,
    /// Include file and line numbers
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json: false,
            file_line: false,
        }
    }
}

impl TracingConfig {
    /// Build from the `[logging]` section plus the CLI verbosity flags.
    ///
    /// `--verbose` raises the level to debug, `--quiet` lowers it to error.
    /// An unparsable level string falls back to the default.
    #[must_use]
    pub fn from_section(section: &LoggingSection, verbose: bool, quiet: bool) -> Self {
        let level = if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            Level::from_str(section.level.trim()).unwrap_or(Self::default().level)
        };

        Self {
            level,
            json: section.json,
            file_line: verbose,
        }
    }
}

/// Try to initialize tracing with custom configuration
///
/// Safe to call more than once; later calls report `AlreadyInitialized`.
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.file_line)
        .with_line_number(config.file_line)
        .with_target(config.file_line);

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry.with(base.json()).try_init()
    } else {
        registry.with(base).try_init()
    };
    result.map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_level_is_used() {
        let section = LoggingSection {
            level: "debug".into(),
            json: true,
        };
        let config = TracingConfig::from_section(&section, false, false);
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.json);
    }

    #[test]
    fn flags_override_section() {
        let section = LoggingSection::default();
        assert_eq!(TracingConfig::from_section(&section, true, false).level, Level::DEBUG);
        assert_eq!(TracingConfig::from_section(&section, false, true).level, Level::ERROR);
    }

    #[test]
    fn bad_level_falls_back() {
        let section = LoggingSection {
            level: "loud".into(),
            json: false,
        };
        assert_eq!(TracingConfig::from_section(&section, false, false).level, Level::WARN);
    }

    #[test]
    fn second_init_reports_already_initialized() {
        let config = TracingConfig::from_section(&LoggingSection::default(), false, true);
        let _ = try_init_tracing_with_config(config.clone());
        let err = try_init_tracing_with_config(config).unwrap_err();
        assert!(matches!(err, TracingError::AlreadyInitialized));
        assert_eq!(err.to_string(), "Tracing subscriber already initialized");
    }
}
