use crate::core::models::audit_entry::AuditEntry;
use crate::core::models::notification::{Notification, NotificationKind};
use crate::core::services::request::RequestContext;

/// Port for a handler registered on the event bus.
pub trait Subscriber: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Notification kinds this subscriber wants to receive.
    fn subscriptions(&self) -> &'static [NotificationKind];

    /// Handle one notification and return the entries it produced.
    ///
    /// Must not fail: unresolvable entities and malformed payloads yield an
    /// empty list.
    fn handle(&self, notification: &Notification, request: &mut RequestContext)
    -> Vec<AuditEntry>;
}
