use std::path::PathBuf;

/// Which sink the router sends entries to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Database,
    File,
}

impl StorageBackend {
    /// Sanitise a stored setting. Anything unrecognised means database.
    pub fn from_setting(value: &str) -> Self {
        match value.trim() {
            "file" | "textfile" => Self::File,
            _ => Self::Database,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::File => "file",
        }
    }
}

/// Port for the two storage settings, read through on every call.
pub trait SettingsSource: Send + Sync {
    fn storage_backend(&self) -> StorageBackend;

    /// Directory that holds `log-manager.txt`. `None` when unset.
    fn file_directory(&self) -> Option<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_falls_back_to_database() {
        assert_eq!(StorageBackend::from_setting("file"), StorageBackend::File);
        assert_eq!(StorageBackend::from_setting("textfile"), StorageBackend::File);
        assert_eq!(StorageBackend::from_setting("redis"), StorageBackend::Database);
        assert_eq!(StorageBackend::from_setting(""), StorageBackend::Database);
    }
}
