use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::audit::sqlite_sink::SqliteSink;
use crate::adapters::audit::text_file_sink::TextFileSink;
use crate::adapters::settings::toml_settings::TomlSettings;
use crate::config::app_config::AppConfig;
use crate::core::errors::Result;
use crate::core::services::router::StorageRouter;

/// Both sinks and the settings that choose between them, wired from one
/// configuration directory.
pub struct Storage {
    pub config: AppConfig,
    pub database: Arc<SqliteSink>,
    pub file: Arc<TextFileSink>,
    settings: Arc<TomlSettings>,
    config_dir: PathBuf,
}

impl Storage {
    /// Load the configuration strictly and build the sinks. Nothing is
    /// opened until the first write or read.
    pub fn open(config_dir: &Path) -> Result<Self> {
        let config = AppConfig::load(config_dir)?;
        let settings = Arc::new(TomlSettings::new(config_dir));
        let database = Arc::new(SqliteSink::new(
            config.database_path(config_dir),
            &config.storage.table_prefix,
        )?);
        let file = Arc::new(TextFileSink::new(settings.clone()));

        Ok(Self {
            config,
            database,
            file,
            settings,
            config_dir: config_dir.to_path_buf(),
        })
    }

    /// Router that re-reads the backend from `config.toml` per entry.
    pub fn router(&self) -> StorageRouter {
        StorageRouter::new(self.settings.clone(), self.database.clone(), self.file.clone())
    }

    pub fn database_path(&self) -> PathBuf {
        self.config.database_path(&self.config_dir)
    }
}
