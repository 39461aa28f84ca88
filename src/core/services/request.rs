use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDateTime, Utc};

use crate::core::models::audit_entry::{AuditEntry, EventType, ObjectType, Severity};
use crate::core::services::pending_state::PendingStateBuffer;

/// Everything scoped to one host request.
///
/// Created when the request starts and dropped when it ends; snapshots and
/// suppression markers therefore never leak into the next request.
#[derive(Debug)]
pub struct RequestContext {
    ip_address: String,
    user_id: u64,
    offset: FixedOffset,
    pub pending: PendingStateBuffer,
    featured_asset_logged: HashSet<u64>,
    logout_seen: bool,
}

impl RequestContext {
    /// Start a request for `user_id` (0 when anonymous) from `ip_address`.
    pub fn new(ip_address: impl Into<String>, user_id: u64, offset: FixedOffset) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_id,
            offset,
            pending: PendingStateBuffer::default(),
            featured_asset_logged: HashSet::new(),
            logout_seen: false,
        }
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    /// Current wall-clock time in the configured offset.
    pub fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }

    /// Build an entry attributed to the current actor.
    pub fn entry(
        &self,
        object_type: ObjectType,
        severity: Severity,
        event_type: EventType,
        message: String,
    ) -> AuditEntry {
        self.entry_for(self.user_id, object_type, severity, event_type, message)
    }

    /// Build an entry attributed to an explicit account.
    pub fn entry_for(
        &self,
        userid: u64,
        object_type: ObjectType,
        severity: Severity,
        event_type: EventType,
        message: String,
    ) -> AuditEntry {
        AuditEntry {
            ip_address: self.ip_address.clone(),
            userid,
            event_time: self.now(),
            object_type,
            severity,
            event_type,
            message,
        }
    }

    /// Claim the featured-asset log slot for a post.
    ///
    /// Returns true the first time it is called for `post_id` in this
    /// request, false afterwards.
    pub fn claim_featured_asset(&mut self, post_id: u64) -> bool {
        self.featured_asset_logged.insert(post_id)
    }

    pub fn featured_asset_claimed(&self, post_id: u64) -> bool {
        self.featured_asset_logged.contains(&post_id)
    }

    pub fn mark_logout(&mut self) {
        self.logout_seen = true;
    }

    /// Whether a logout already ran in this request.
    pub fn logout_seen(&self) -> bool {
        self.logout_seen
    }
}
