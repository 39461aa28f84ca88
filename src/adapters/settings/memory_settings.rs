use std::path::PathBuf;

use parking_lot::RwLock;

use crate::core::traits::settings::{SettingsSource, StorageBackend};

#[derive(Debug, Default)]
struct State {
    backend: StorageBackend,
    file_directory: Option<PathBuf>,
}

/// In-process settings that can be switched while the router is live.
#[derive(Debug, Default)]
pub struct MemorySettings {
    state: RwLock<State>,
}

impl MemorySettings {
    pub fn new(backend: StorageBackend, file_directory: Option<PathBuf>) -> Self {
        Self {
            state: RwLock::new(State {
                backend,
                file_directory,
            }),
        }
    }

    pub fn set_backend(&self, backend: StorageBackend) {
        self.state.write().backend = backend;
    }

    pub fn set_file_directory(&self, dir: Option<PathBuf>) {
        self.state.write().file_directory = dir;
    }
}

impl SettingsSource for MemorySettings {
    fn storage_backend(&self) -> StorageBackend {
        self.state.read().backend
    }

    fn file_directory(&self) -> Option<PathBuf> {
        self.state.read().file_directory.clone()
    }
}
