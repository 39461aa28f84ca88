use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::errors::{LogManagerError, Result};
use crate::core::models::audit_entry::AuditEntry;
use crate::core::traits::settings::SettingsSource;
use crate::core::traits::sink::AuditSink;

/// Name of the log file inside the configured directory.
pub const LOG_FILE_NAME: &str = "log-manager.txt";

/// Width of the dashed rule around the header.
pub const SEPARATOR_WIDTH: usize = 88;

/// Render one fixed-width row: time, user id, event type, message.
pub fn format_row(time: &str, userid: &str, event_type: &str, message: &str) -> String {
    format!("{time:<20} | {userid:<7} | {event_type:<10} | {message}\n")
}

/// The three lines written before the first entry of a new file.
pub fn header_block() -> String {
    let rule = "-".repeat(SEPARATOR_WIDTH);
    format!(
        "{rule}\n{}{rule}\n",
        format_row("Date & Time", "User ID", "Event Type", "Message")
    )
}

/// Sink that appends fixed-width lines to `<directory>/log-manager.txt`.
///
/// The directory is read from settings on every write. The file is opened,
/// appended and closed per entry; header and row go out in a single write so
/// concurrent appenders never split a line.
///
/// Example file:
/// ```text
/// ----------------------------------------------------------------------------------------
/// Date & Time          | User ID | Event Type | Message
/// ----------------------------------------------------------------------------------------
/// 2026-03-02 10:15:00  | 1       | created    | New post has been created.<br/>…
/// ```
pub struct TextFileSink {
    settings: Arc<dyn SettingsSource>,
}

impl TextFileSink {
    pub fn new(settings: Arc<dyn SettingsSource>) -> Self {
        Self { settings }
    }

    /// Resolve the log file path for the current settings, if configured.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.settings
            .file_directory()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.join(LOG_FILE_NAME))
    }

    /// Make sure `dir` exists and accepts writes.
    fn prepare_directory(dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            fs::create_dir_all(dir).map_err(|e| LogManagerError::StorageUnavailable {
                path: dir.to_path_buf(),
                reason: format!("cannot create directory: {e}"),
            })?;
        }

        let readonly = fs::metadata(dir)
            .map(|m| m.permissions().readonly())
            .unwrap_or(true);
        if readonly {
            return Err(LogManagerError::StorageUnavailable {
                path: dir.to_path_buf(),
                reason: "directory is not writable".into(),
            });
        }
        Ok(())
    }
}

impl AuditSink for TextFileSink {
    fn write(&self, entry: &AuditEntry) -> Result<()> {
        let path = self
            .current_path()
            .ok_or_else(|| LogManagerError::StorageUnavailable {
                path: PathBuf::new(),
                reason: "no log directory configured".into(),
            })?;
        if let Some(dir) = path.parent() {
            Self::prepare_directory(dir)?;
        }

        let is_new = !path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LogManagerError::StorageUnavailable {
                path: path.clone(),
                reason: format!("cannot open log file: {e}"),
            })?;

        let mut block = if is_new { header_block() } else { String::new() };
        block.push_str(&format_row(
            &entry.formatted_time(),
            &entry.userid.to_string(),
            entry.event_type.as_str(),
            &entry.message.replace(['\r', '\n'], " "),
        ));

        file.write_all(block.as_bytes())?;
        Ok(())
    }
}
