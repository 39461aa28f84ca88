use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditEntry;

/// Columns the read API accepts for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    IpAddress,
    UserId,
    EventTime,
    ObjectType,
    Severity,
    EventType,
}

impl SortColumn {
    /// Column name in the `log_db` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::IpAddress => "ip_address",
            Self::UserId => "userid",
            Self::EventTime => "event_time",
            Self::ObjectType => "object_type",
            Self::Severity => "severity",
            Self::EventType => "event_type",
        }
    }

    /// Parse a column name as the admin list sends it.
    pub fn from_column(name: &str) -> Option<Self> {
        [
            Self::Id,
            Self::IpAddress,
            Self::UserId,
            Self::EventTime,
            Self::ObjectType,
            Self::Severity,
            Self::EventType,
        ]
        .into_iter()
        .find(|c| c.column() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// One page request against the stored entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    /// Free-text filter over ip address, event type, object type and message.
    pub search: Option<String>,
    pub order_by: SortColumn,
    pub direction: SortDirection,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            search: None,
            order_by: SortColumn::Id,
            direction: SortDirection::Desc,
            page: 1,
            per_page: 20,
        }
    }
}

impl AuditQuery {
    /// Row offset of the requested page. Saturates instead of overflowing.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// An entry read back from storage, with its primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub id: i64,
    pub entry: AuditEntry,
}

/// Port for paged retrieval, consumed by list views.
pub trait AuditReader: Send + Sync {
    /// Fetch one page of entries.
    fn fetch(&self, query: &AuditQuery) -> Result<Vec<StoredEntry>>;

    /// Count entries matching the same filter `fetch` applies.
    fn count(&self, search: Option<&str>) -> Result<u64>;
}
