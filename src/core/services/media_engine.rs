use std::sync::Arc;

use tracing::debug;

use crate::core::models::audit_entry::{AuditEntry, EventType, ObjectType, Severity};
use crate::core::models::change::FeaturedAssetChange;
use crate::core::models::entities::Post;
use crate::core::models::notification::{
    FEATURED_ASSET_META_KEY, MetaOperation, Notification, NotificationKind,
};
use crate::core::services::markup::{self, BR};
use crate::core::services::request::RequestContext;
use crate::core::traits::directory::ContentDirectory;
use crate::core::traits::subscriber::Subscriber;

/// Audits the featured asset of content items.
///
/// Two detectors share one per-request marker per post:
///
/// - the save diff (`PostBeforeUpdate` snapshot, `PostSaved` compare), which
///   can tell assigned, modified and removed apart;
/// - the metadata detector (`PostMetaChanged` on the featured-asset key),
///   which covers changes made outside a full save.
///
/// While a save snapshot is pending for a post the metadata detector stays
/// silent and leaves the change to the diff. Whichever detector emits first
/// claims the marker; later evaluations for that post in the same request
/// emit nothing.
pub struct FeaturedAssetEngine {
    directory: Arc<dyn ContentDirectory>,
}

impl FeaturedAssetEngine {
    pub fn new(directory: Arc<dyn ContentDirectory>) -> Self {
        Self { directory }
    }

    fn is_revision(&self, post_id: u64) -> bool {
        self.directory
            .post(post_id)
            .is_some_and(|p| p.is_revision_or_autosave())
    }

    fn capture_before_update(&self, post_id: u64, request: &mut RequestContext) {
        if post_id == 0 || self.is_revision(post_id) {
            return;
        }
        let current = self.directory.featured_asset(post_id);
        request.pending.featured_assets.capture(post_id, current);
    }

    fn saved(
        &self,
        post_id: u64,
        post: Option<&Post>,
        request: &mut RequestContext,
    ) -> Option<AuditEntry> {
        let post = post.cloned().or_else(|| self.directory.post(post_id))?;
        if post.is_revision_or_autosave() {
            return None;
        }

        let old = request.pending.featured_assets.take(post_id).flatten();
        if !request.claim_featured_asset(post_id) {
            debug!(post_id, "featured asset already logged in this request");
            return None;
        }

        let new = self.directory.featured_asset(post_id);
        match FeaturedAssetChange::classify(old, new) {
            FeaturedAssetChange::Unchanged => None,
            FeaturedAssetChange::Removed { .. } => Some(self.removed_entry(&post, request)),
            FeaturedAssetChange::Assigned { new } => {
                self.changed_entry(&post, new, EventType::Assigned, request)
            }
            FeaturedAssetChange::Modified { new, .. } => {
                self.changed_entry(&post, new, EventType::Modified, request)
            }
        }
    }

    fn changed_entry(
        &self,
        post: &Post,
        attachment_id: u64,
        event_type: EventType,
        request: &RequestContext,
    ) -> Option<AuditEntry> {
        let url = self.directory.attachment_url(attachment_id)?;

        let message = [
            format!(
                "Media ID {} {} as featured image.",
                markup::bold(&attachment_id.to_string()),
                event_type
            ),
            markup::labelled("Post ID", &post.id.to_string()),
            markup::labelled("Post Title", &post.title),
            format!("Media URL: {}", markup::link(&url, "View Media")),
        ]
        .join(BR);

        Some(request.entry(ObjectType::Media, Severity::Notice, event_type, message))
    }

    fn removed_entry(&self, post: &Post, request: &RequestContext) -> AuditEntry {
        let mut message = [
            "Featured image removed from post.".to_string(),
            markup::labelled("Post ID", &post.id.to_string()),
            markup::labelled("Post Title", &post.title),
        ]
        .join(BR);
        if let Some(link) = self.directory.edit_post_link(post.id) {
            message.push_str(BR);
            message.push_str(&format!("Edit Post: {}", markup::link(&link, "Edit")));
        }

        request.entry(ObjectType::Media, Severity::Notice, EventType::Deleted, message)
    }

    fn meta_changed(
        &self,
        operation: MetaOperation,
        post_id: u64,
        meta_key: &str,
        meta_value: Option<&str>,
        request: &mut RequestContext,
    ) -> Option<AuditEntry> {
        if meta_key != FEATURED_ASSET_META_KEY {
            return None;
        }
        let post = self.directory.post(post_id)?;
        if post.is_revision_or_autosave() {
            return None;
        }
        if request.pending.featured_assets.contains(post_id) {
            debug!(post_id, "featured asset meta change left to the save diff");
            return None;
        }
        if !request.claim_featured_asset(post_id) {
            return None;
        }

        let (event_type, headline) = match operation {
            MetaOperation::Added | MetaOperation::Updated => {
                (EventType::Assigned, "Featured image assigned.")
            }
            MetaOperation::Deleted => (EventType::Deleted, "Featured image removed."),
        };

        let mut lines = vec![
            headline.to_string(),
            markup::labelled("Post", &post.title),
            markup::labelled("Post ID", &post_id.to_string()),
        ];
        if event_type == EventType::Assigned {
            let media_id = meta_value
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0);
            lines.push(markup::labelled("Media ID", &media_id.to_string()));
        }

        Some(request.entry(ObjectType::Media, Severity::Notice, event_type, lines.join(BR)))
    }
}

impl Subscriber for FeaturedAssetEngine {
    fn name(&self) -> &'static str {
        "featured-asset"
    }

    fn subscriptions(&self) -> &'static [NotificationKind] {
        &[
            NotificationKind::PostBeforeUpdate,
            NotificationKind::PostSaved,
            NotificationKind::PostMetaChanged,
        ]
    }

    fn handle(
        &self,
        notification: &Notification,
        request: &mut RequestContext,
    ) -> Vec<AuditEntry> {
        let entry = match notification {
            Notification::PostBeforeUpdate { post_id } => {
                self.capture_before_update(*post_id, request);
                None
            }
            Notification::PostSaved { post_id, post, .. } => {
                self.saved(*post_id, post.as_ref(), request)
            }
            Notification::PostMetaChanged {
                operation,
                post_id,
                meta_key,
                meta_value,
                ..
            } => self.meta_changed(*operation, *post_id, meta_key, meta_value.as_deref(), request),
            _ => None,
        };
        entry.into_iter().collect()
    }
}
