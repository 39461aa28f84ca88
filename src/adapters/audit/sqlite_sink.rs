use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};

use crate::core::errors::{LogManagerError, Result};
use crate::core::models::audit_entry::{AuditEntry, EVENT_TIME_FORMAT};
use crate::core::traits::reader::{AuditQuery, AuditReader, SortDirection, StoredEntry};
use crate::core::traits::sink::AuditSink;

/// Table name appended to the configured prefix.
pub const TABLE_NAME: &str = "log_db";

const SEARCH_PREDICATE: &str = "ip_address LIKE ?1 ESCAPE '\\' \
     OR event_type LIKE ?1 ESCAPE '\\' \
     OR object_type LIKE ?1 ESCAPE '\\' \
     OR message LIKE ?1 ESCAPE '\\'";

/// Accept only prefixes that are safe to splice into SQL.
pub fn validate_table_prefix(prefix: &str) -> Result<()> {
    if prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(LogManagerError::InvalidConfig {
            detail: format!(
                "table prefix '{prefix}' may only contain ASCII letters, digits and '_'"
            ),
        })
    }
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

/// Raw column values of one row, before enum parsing.
struct RawRow {
    id: i64,
    ip_address: String,
    userid: i64,
    event_time: String,
    object_type: String,
    severity: String,
    event_type: String,
    message: String,
}

impl RawRow {
    fn into_stored(self) -> Result<StoredEntry> {
        let event_time = NaiveDateTime::parse_from_str(&self.event_time, EVENT_TIME_FORMAT)
            .map_err(|e| LogManagerError::MalformedRow {
                detail: format!("row {}: bad event_time '{}': {e}", self.id, self.event_time),
            })?;
        Ok(StoredEntry {
            id: self.id,
            entry: AuditEntry {
                ip_address: self.ip_address,
                userid: u64::try_from(self.userid).unwrap_or(0),
                event_time,
                object_type: self.object_type.parse()?,
                severity: self.severity.parse()?,
                event_type: self.event_type.parse()?,
                message: self.message,
            },
        })
    }
}

/// Database sink and read API backed by one SQLite table.
///
/// The connection is opened on first use. If opening fails the write is
/// reported as an error and the next write tries again.
pub struct SqliteSink {
    path: Option<PathBuf>,
    table: String,
    conn: Mutex<Option<Connection>>,
}

impl SqliteSink {
    /// Sink for the database file at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>, table_prefix: &str) -> Result<Self> {
        validate_table_prefix(table_prefix)?;
        Ok(Self {
            path: Some(path.into()),
            table: format!("{table_prefix}{TABLE_NAME}"),
            conn: Mutex::new(None),
        })
    }

    /// Sink over a private in-memory database.
    pub fn in_memory(table_prefix: &str) -> Result<Self> {
        validate_table_prefix(table_prefix)?;
        let table = format!("{table_prefix}{TABLE_NAME}");
        let conn = Connection::open_in_memory()?;
        Self::ensure_schema(&conn, &table)?;
        Ok(Self {
            path: None,
            table,
            conn: Mutex::new(Some(conn)),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create the table if it does not exist yet.
    pub fn ensure_schema(conn: &Connection, table: &str) -> Result<()> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ip_address TEXT NOT NULL DEFAULT '',
                userid INTEGER NOT NULL DEFAULT 0,
                event_time TEXT NOT NULL,
                object_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                event_type TEXT NOT NULL,
                message TEXT NOT NULL
            );"
        ))?;
        Ok(())
    }

    /// Open (and initialise) the database now instead of on first use.
    pub fn initialize(&self) -> Result<()> {
        self.with_connection(|_| Ok(()))
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.conn.lock();
        if let Some(conn) = guard.as_ref() {
            return f(conn);
        }

        let path = self.path.as_ref().ok_or_else(|| LogManagerError::StorageUnavailable {
            path: PathBuf::from(":memory:"),
            reason: "in-memory connection was lost".into(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LogManagerError::StorageUnavailable {
                path: parent.to_path_buf(),
                reason: format!("cannot create directory: {e}"),
            })?;
        }
        let conn = Connection::open(path)?;
        Self::ensure_schema(&conn, &self.table)?;
        f(guard.insert(conn))
    }
}

impl AuditSink for SqliteSink {
    fn write(&self, entry: &AuditEntry) -> Result<()> {
        let userid = i64::try_from(entry.userid).map_err(|_| LogManagerError::Serialization {
            detail: format!("user id {} does not fit the userid column", entry.userid),
        })?;

        self.with_connection(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO {} (ip_address, userid, event_time, object_type, severity, event_type, message)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    self.table
                ),
                params![
                    entry.ip_address,
                    userid,
                    entry.formatted_time(),
                    entry.object_type.as_str(),
                    entry.severity.as_str(),
                    entry.event_type.as_str(),
                    entry.message,
                ],
            )?;
            Ok(())
        })
    }
}

impl AuditReader for SqliteSink {
    fn fetch(&self, query: &AuditQuery) -> Result<Vec<StoredEntry>> {
        if query.per_page == 0 {
            return Err(LogManagerError::InvalidQuery {
                detail: "per_page must be at least 1".into(),
            });
        }

        let mut values = Vec::new();
        let filter = match search_term(query.search.as_deref()) {
            Some(term) => {
                values.push(Value::Text(like_pattern(term)));
                format!("WHERE {SEARCH_PREDICATE}")
            }
            None => String::new(),
        };
        let limit_at = values.len() + 1;
        values.push(Value::Integer(i64::try_from(query.per_page).unwrap_or(i64::MAX)));
        values.push(Value::Integer(i64::try_from(query.offset()).unwrap_or(i64::MAX)));

        let direction = match query.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        let sql = format!(
            "SELECT id, ip_address, userid, event_time, object_type, severity, event_type, message
             FROM {} {filter}
             ORDER BY {} {direction}, id {direction}
             LIMIT ?{limit_at} OFFSET ?{}",
            self.table,
            query.order_by.column(),
            limit_at + 1
        );

        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    ip_address: row.get(1)?,
                    userid: row.get(2)?,
                    event_time: row.get(3)?,
                    object_type: row.get(4)?,
                    severity: row.get(5)?,
                    event_type: row.get(6)?,
                    message: row.get(7)?,
                })
            })?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?.into_stored()?);
            }
            Ok(entries)
        })
    }

    fn count(&self, search: Option<&str>) -> Result<u64> {
        self.with_connection(|conn| {
            let total: i64 = match search_term(search) {
                Some(term) => conn.query_row(
                    &format!("SELECT COUNT(*) FROM {} WHERE {SEARCH_PREDICATE}", self.table),
                    params![like_pattern(term)],
                    |row| row.get(0),
                )?,
                None => conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", self.table),
                    [],
                    |row| row.get(0),
                )?,
            };
            Ok(u64::try_from(total).unwrap_or(0))
        })
    }
}
