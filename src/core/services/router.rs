use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::models::audit_entry::AuditEntry;
use crate::core::traits::settings::{SettingsSource, StorageBackend};
use crate::core::traits::sink::AuditSink;

/// Sends each entry to whichever sink the settings select at call time.
#[derive(Clone)]
pub struct StorageRouter {
    settings: Arc<dyn SettingsSource>,
    database: Arc<dyn AuditSink>,
    file: Arc<dyn AuditSink>,
}

impl StorageRouter {
    pub fn new(
        settings: Arc<dyn SettingsSource>,
        database: Arc<dyn AuditSink>,
        file: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            settings,
            database,
            file,
        }
    }

    /// Persist an entry through the active sink.
    ///
    /// Never fails: a sink error is reported on the diagnostic channel and
    /// the entry is dropped.
    pub fn record(&self, entry: &AuditEntry) {
        let backend = self.settings.storage_backend();
        let sink = match backend {
            StorageBackend::Database => &self.database,
            StorageBackend::File => &self.file,
        };

        match sink.write(entry) {
            Ok(()) => debug!(
                backend = backend.as_str(),
                event_type = %entry.event_type,
                object_type = %entry.object_type,
                "audit entry recorded"
            ),
            Err(e) => warn!(
                backend = backend.as_str(),
                event_type = %entry.event_type,
                error = %e,
                "audit entry dropped"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{LogManagerError, Result};
    use crate::core::models::audit_entry::{EventType, ObjectType, Severity};
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use std::path::PathBuf;

    #[derive(Default)]
    struct CollectingSink {
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    impl AuditSink for CollectingSink {
        fn write(&self, entry: &AuditEntry) -> Result<()> {
            if self.fail {
                return Err(LogManagerError::StorageUnavailable {
                    path: PathBuf::from("/nowhere"),
                    reason: "offline".into(),
                });
            }
            self.seen.lock().push(entry.message.clone());
            Ok(())
        }
    }

    struct Switch(Mutex<StorageBackend>);

    impl SettingsSource for Switch {
        fn storage_backend(&self) -> StorageBackend {
            *self.0.lock()
        }

        fn file_directory(&self) -> Option<PathBuf> {
            None
        }
    }

    fn entry(message: &str) -> AuditEntry {
        AuditEntry {
            ip_address: String::new(),
            userid: 0,
            event_time: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            object_type: ObjectType::Post,
            severity: Severity::Notice,
            event_type: EventType::Created,
            message: message.into(),
        }
    }

    #[test]
    fn backend_is_read_on_every_call() {
        let settings = Arc::new(Switch(Mutex::new(StorageBackend::Database)));
        let db = Arc::new(CollectingSink::default());
        let file = Arc::new(CollectingSink::default());
        let router = StorageRouter::new(settings.clone(), db.clone(), file.clone());

        router.record(&entry("first"));
        *settings.0.lock() = StorageBackend::File;
        router.record(&entry("second"));

        assert_eq!(*db.seen.lock(), vec!["first".to_string()]);
        assert_eq!(*file.seen.lock(), vec!["second".to_string()]);
    }

    #[test]
    fn sink_failure_is_swallowed() {
        let settings = Arc::new(Switch(Mutex::new(StorageBackend::Database)));
        let db = Arc::new(CollectingSink {
            fail: true,
            ..CollectingSink::default()
        });
        let file = Arc::new(CollectingSink::default());
        let router = StorageRouter::new(settings, db, file.clone());

        router.record(&entry("lost"));
        assert!(file.seen.lock().is_empty());
    }
}
