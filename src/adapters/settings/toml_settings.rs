use std::path::PathBuf;

use crate::config::app_config::AppConfig;
use crate::core::traits::settings::{SettingsSource, StorageBackend};

/// Settings backed by `config.toml`, re-read on every call so that an edit
/// takes effect on the next write without a restart.
#[derive(Debug, Clone)]
pub struct TomlSettings {
    config_dir: PathBuf,
}

impl TomlSettings {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    fn current(&self) -> AppConfig {
        AppConfig::load_or_default(&self.config_dir)
    }
}

impl SettingsSource for TomlSettings {
    fn storage_backend(&self) -> StorageBackend {
        self.current().backend()
    }

    fn file_directory(&self) -> Option<PathBuf> {
        self.current().file_directory(&self.config_dir)
    }
}
