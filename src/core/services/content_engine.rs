use std::sync::Arc;

use tracing::debug;

use crate::core::models::audit_entry::{AuditEntry, EventType, ObjectType, Severity};
use crate::core::models::entities::Post;
use crate::core::models::notification::{Notification, NotificationKind};
use crate::core::services::markup::{self, BR};
use crate::core::services::request::RequestContext;
use crate::core::traits::directory::ContentDirectory;
use crate::core::traits::subscriber::Subscriber;

/// Post types that hold custom-field schema rather than content.
const FIELD_SCHEMA_TYPES: [(&str, &str); 2] =
    [("acf-field", "ACF Field"), ("acf-field-group", "ACF Field Group")];

/// Classify a status transition into an event type and headline.
///
/// Rules are checked in order; the first match wins.
pub fn classify_transition(new_status: &str, old_status: &str) -> (EventType, String) {
    if old_status == "trash" && new_status != "trash" {
        return (EventType::Restored, "Post has been restored.".into());
    }
    if new_status == "trash" {
        return (EventType::Trashed, "Post has been moved to trash.".into());
    }
    if old_status == "auto-draft" && new_status != "auto-draft" {
        return (EventType::Created, "New post has been created.".into());
    }
    if old_status != new_status {
        let headline = if new_status == "publish" {
            "Post has been published.".to_string()
        } else if new_status == "private" {
            "Post has been set to private.".to_string()
        } else {
            format!(
                "Post status changed from {} to {}.",
                markup::escape(old_status),
                markup::escape(new_status)
            )
        };
        return (EventType::Modified, headline);
    }
    (EventType::Modified, "Post content has been updated.".into())
}

/// Describe title, excerpt and slug differences between two versions.
pub fn post_field_changes(before: &Post, after: &Post) -> Vec<String> {
    let mut changes = Vec::new();

    if before.title != after.title {
        changes.push(format!(
            "Title changed from {} to {}",
            markup::bold(&before.title),
            markup::bold(&after.title)
        ));
    }
    if before.excerpt != after.excerpt {
        changes.push("Excerpt updated.".to_string());
    }
    if before.slug != after.slug {
        changes.push(format!(
            "Slug changed from {} to {}",
            markup::bold(&before.slug),
            markup::bold(&after.slug)
        ));
    }

    changes
}

/// Audits content status transitions, field edits and permanent deletes.
pub struct ContentLifecycleEngine {
    directory: Arc<dyn ContentDirectory>,
}

impl ContentLifecycleEngine {
    pub fn new(directory: Arc<dyn ContentDirectory>) -> Self {
        Self { directory }
    }

    fn status_transition(
        &self,
        new_status: &str,
        old_status: &str,
        post: Option<&Post>,
        request: &RequestContext,
    ) -> Option<AuditEntry> {
        let post = post.filter(|p| p.id != 0)?;
        if post.is_revision_or_autosave() {
            debug!(post_id = post.id, "skipping revision status transition");
            return None;
        }

        let edit_link = self.directory.edit_post_link(post.id);

        if let Some((_, label)) = FIELD_SCHEMA_TYPES
            .iter()
            .find(|(post_type, _)| *post_type == post.post_type)
        {
            let mut message = format!("{label} updated.");
            message.push_str(BR);
            message.push_str(&markup::labelled("Title", &post.title));
            message.push_str(BR);
            message.push_str(&markup::labelled("ID", &post.id.to_string()));
            if let Some(link) = edit_link.as_deref() {
                message.push_str(BR);
                message.push_str(&markup::link(link, "Edit"));
            }
            return Some(request.entry(
                ObjectType::Settings,
                Severity::Notice,
                EventType::Modified,
                message,
            ));
        }

        let (event_type, mut message) = classify_transition(new_status, old_status);
        message.push_str(BR);
        message.push_str(&markup::labelled("Post Title", &post.title));
        message.push_str(BR);
        message.push_str(&markup::labelled("Post ID", &post.id.to_string()));
        message.push_str(BR);
        message.push_str(&markup::labelled("Post Type", &post.post_type));
        if let Some(link) = edit_link.as_deref() {
            message.push_str(BR);
            message.push_str(&format!(
                "View post: <b>{}</b>",
                markup::link(link, "view post in editor")
            ));
        }

        Some(request.entry(ObjectType::Post, Severity::Notice, event_type, message))
    }

    fn permanent_delete(&self, post_id: u64, request: &RequestContext) -> Option<AuditEntry> {
        let post = self.directory.post(post_id)?;
        if post.is_revision() {
            return None;
        }

        let message = [
            "Permanently deleted the post.".to_string(),
            markup::labelled("Post Title", &post.title),
            markup::labelled("Post ID", &post.id.to_string()),
            markup::labelled("Post Type", &post.post_type),
        ]
        .join(BR);

        Some(request.entry(ObjectType::Post, Severity::Notice, EventType::Deleted, message))
    }

    fn field_diff(
        &self,
        post_id: u64,
        before: Option<&Post>,
        after: Option<&Post>,
        request: &RequestContext,
    ) -> Option<AuditEntry> {
        let (before, after) = (before?, after?);
        if after.is_revision_or_autosave() {
            return None;
        }

        let changes = post_field_changes(before, after);
        if changes.is_empty() {
            return None;
        }

        let mut message = changes.join(BR);
        message.push_str(BR);
        message.push_str(&markup::labelled("Post ID", &post_id.to_string()));
        message.push_str(BR);
        message.push_str(&markup::labelled("Post Title", &after.title));

        Some(request.entry(ObjectType::Post, Severity::Notice, EventType::Modified, message))
    }
}

impl Subscriber for ContentLifecycleEngine {
    fn name(&self) -> &'static str {
        "content"
    }

    fn subscriptions(&self) -> &'static [NotificationKind] {
        &[
            NotificationKind::PostStatusTransition,
            NotificationKind::PostBeforeDelete,
            NotificationKind::PostUpdated,
        ]
    }

    fn handle(
        &self,
        notification: &Notification,
        request: &mut RequestContext,
    ) -> Vec<AuditEntry> {
        let entry = match notification {
            Notification::PostStatusTransition {
                new_status,
                old_status,
                post,
            } => self.status_transition(new_status, old_status, post.as_ref(), request),
            Notification::PostBeforeDelete { post_id } => self.permanent_delete(*post_id, request),
            Notification::PostUpdated {
                post_id,
                before,
                after,
            } => self.field_diff(*post_id, before.as_ref(), after.as_ref(), request),
            _ => None,
        };
        entry.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::directory::site_snapshot::{SiteData, SiteSnapshot};
    use chrono::FixedOffset;

    fn post(id: u64, title: &str) -> Post {
        Post {
            id,
            post_type: "post".into(),
            status: "publish".into(),
            title: title.into(),
            slug: title.to_lowercase().replace(' ', "-"),
            ..Post::default()
        }
    }

    fn engine_with(posts: Vec<Post>) -> ContentLifecycleEngine {
        let site = SiteSnapshot::new(SiteData {
            site_url: "https://cms.test".into(),
            posts,
            ..SiteData::default()
        });
        ContentLifecycleEngine::new(Arc::new(site))
    }

    fn request() -> RequestContext {
        RequestContext::new("127.0.0.1", 1, FixedOffset::east_opt(0).unwrap())
    }

    fn transition(new: &str, old: &str, post: Post) -> Notification {
        Notification::PostStatusTransition {
            new_status: new.into(),
            old_status: old.into(),
            post: Some(post),
        }
    }

    #[test]
    fn transition_table() {
        assert_eq!(classify_transition("draft", "trash").0, EventType::Restored);
        assert_eq!(classify_transition("trash", "publish").0, EventType::Trashed);
        assert_eq!(classify_transition("draft", "auto-draft").0, EventType::Created);
        assert_eq!(
            classify_transition("publish", "draft"),
            (EventType::Modified, "Post has been published.".to_string())
        );
        assert_eq!(
            classify_transition("private", "publish").1,
            "Post has been set to private."
        );
        assert_eq!(
            classify_transition("pending", "draft").1,
            "Post status changed from draft to pending."
        );
        assert_eq!(
            classify_transition("publish", "publish").1,
            "Post content has been updated."
        );
    }

    #[test]
    fn restore_wins_over_trash_rules() {
        // trash -> trash is not a restore
        assert_eq!(classify_transition("trash", "trash").0, EventType::Trashed);
    }

    #[test]
    fn status_entry_carries_post_details() {
        let engine = engine_with(vec![]);
        let entries = engine.handle(&transition("publish", "draft", post(9, "Hello")), &mut request());

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.object_type, ObjectType::Post);
        assert_eq!(entry.severity, Severity::Notice);
        assert!(entry.message.starts_with("Post has been published."));
        assert!(entry.message.contains("Post ID: <b>9</b>"));
        assert!(entry.message.contains("view post in editor"));
    }

    #[test]
    fn revisions_and_autosaves_are_skipped() {
        let engine = engine_with(vec![]);
        let mut revision = post(10, "Rev");
        revision.post_type = "revision".into();
        revision.parent = 9;
        let mut autosave = revision.clone();
        autosave.slug = "9-autosave-v1".into();

        assert!(engine.handle(&transition("inherit", "new", revision), &mut request()).is_empty());
        assert!(engine.handle(&transition("inherit", "new", autosave), &mut request()).is_empty());
    }

    #[test]
    fn missing_post_payload_is_a_no_op() {
        let engine = engine_with(vec![]);
        let n = Notification::PostStatusTransition {
            new_status: "publish".into(),
            old_status: "draft".into(),
            post: None,
        };
        assert!(engine.handle(&n, &mut request()).is_empty());
    }

    #[test]
    fn field_schema_posts_log_as_settings() {
        let engine = engine_with(vec![]);
        let mut group = post(30, "Hero fields");
        group.post_type = "acf-field-group".into();

        let entries = engine.handle(&transition("publish", "publish", group), &mut request());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].object_type, ObjectType::Settings);
        assert!(entries[0].message.starts_with("ACF Field Group updated."));
    }

    #[test]
    fn field_diff_lists_only_changed_fields() {
        let engine = engine_with(vec![]);
        let before = post(5, "Old title");
        let mut after = before.clone();
        after.title = "New title".into();

        let entries = engine.handle(
            &Notification::PostUpdated {
                post_id: 5,
                before: Some(before),
                after: Some(after),
            },
            &mut request(),
        );

        assert_eq!(entries.len(), 1);
        let msg = &entries[0].message;
        assert!(msg.contains("Title changed from <b>Old title</b> to <b>New title</b>"));
        assert!(!msg.contains("Excerpt"));
        assert!(!msg.contains("Slug changed"));
    }

    #[test]
    fn field_diff_without_changes_is_silent() {
        let engine = engine_with(vec![]);
        let p = post(5, "Same");
        let entries = engine.handle(
            &Notification::PostUpdated {
                post_id: 5,
                before: Some(p.clone()),
                after: Some(p),
            },
            &mut request(),
        );
        assert!(entries.is_empty());
    }

    #[test]
    fn permanent_delete_resolves_post() {
        let engine = engine_with(vec![post(12, "Gone")]);

        let entries = engine.handle(&Notification::PostBeforeDelete { post_id: 12 }, &mut request());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_type, EventType::Deleted);

        let missing = engine.handle(&Notification::PostBeforeDelete { post_id: 99 }, &mut request());
        assert!(missing.is_empty());
    }
}
