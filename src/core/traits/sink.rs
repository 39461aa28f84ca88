use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditEntry;

/// Port for a concrete storage backend.
pub trait AuditSink: Send + Sync {
    /// Persist one entry. Implementations do not retry.
    fn write(&self, entry: &AuditEntry) -> Result<()>;
}
