use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::core::models::audit_entry::{AuditEntry, EventType, ObjectType, Severity};
use crate::core::models::change::{FieldChange, TermField, TermSetDiff};
use crate::core::models::entities::Term;
use crate::core::models::notification::{FieldOwner, Notification, NotificationKind};
use crate::core::services::markup::{self, BR};
use crate::core::services::pending_state::TermSnapshot;
use crate::core::services::request::RequestContext;
use crate::core::traits::directory::{ContentDirectory, FieldMap};
use crate::core::traits::subscriber::Subscriber;

/// Compare the four tracked term fields, in display order.
pub fn term_field_changes(before: &TermSnapshot, after: &Term) -> Vec<TermField> {
    let mut changes = Vec::new();

    if before.parent != after.parent {
        changes.push(TermField::Parent {
            old: before.parent,
            new: after.parent,
        });
    }
    if before.name != after.name {
        changes.push(TermField::Name {
            old: before.name.clone(),
            new: after.name.clone(),
        });
    }
    if before.slug != after.slug {
        changes.push(TermField::Slug {
            old: before.slug.clone(),
            new: after.slug.clone(),
        });
    }
    if before.description != after.description {
        changes.push(TermField::Description {
            old: before.description.clone(),
            new: after.description.clone(),
        });
    }

    changes
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Equality that treats null and "" alike, and a number equal to its
/// string form, the way field values round-trip through form posts.
fn loosely_equal(old: Option<&Value>, new: &Value) -> bool {
    let old = old.unwrap_or(&Value::Null);
    if is_blank(old) && is_blank(new) {
        return true;
    }
    match (old, new) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        _ => old == new,
    }
}

/// Keys of `new` whose value differs from `old`. Keys only in `old` are
/// ignored; keys only in `new` count as changed from null.
pub fn diff_fields(old: &FieldMap, new: &FieldMap) -> Vec<FieldChange> {
    new.iter()
        .filter(|(key, value)| !loosely_equal(old.get(key.as_str()), value))
        .map(|(key, value)| FieldChange {
            key: key.clone(),
            old: old.get(key).cloned(),
            new: value.clone(),
        })
        .collect()
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "\"\"".to_string(),
        Some(v) if is_blank(v) => "\"\"".to_string(),
        Some(Value::String(s)) => markup::escape(s),
        Some(other) => markup::escape(&other.to_string()),
    }
}

/// Audits taxonomy terms: create, edit, delete, assignment and custom fields.
pub struct TaxonomyLifecycleEngine {
    directory: Arc<dyn ContentDirectory>,
}

impl TaxonomyLifecycleEngine {
    pub fn new(directory: Arc<dyn ContentDirectory>) -> Self {
        Self { directory }
    }

    fn term_link(&self, term: &Term) -> Option<String> {
        self.directory.edit_term_link(term.id, &term.taxonomy)
    }

    fn created(&self, term_id: u64, taxonomy: &str, request: &RequestContext) -> Option<AuditEntry> {
        let term = self.directory.term(term_id, Some(taxonomy))?;
        let link = self.directory.edit_term_link(term_id, taxonomy);

        let message = [
            "Taxonomy term created.".to_string(),
            format!("Name: {}", markup::bold_link(link.as_deref(), &term.name)),
            markup::labelled("ID", &term_id.to_string()),
            markup::labelled("Taxonomy", taxonomy),
        ]
        .join(BR);

        Some(request.entry(ObjectType::Taxonomy, Severity::Notice, EventType::Created, message))
    }

    fn capture_before_edit(&self, term_id: u64, taxonomy: &str, request: &mut RequestContext) {
        if let Some(term) = self.directory.term(term_id, Some(taxonomy)) {
            request
                .pending
                .term_edits
                .capture(term_id, TermSnapshot::from(&term));
        }
    }

    fn describe(&self, change: &TermField, after: &Term, link: Option<&str>) -> String {
        let name = markup::bold_link(link, &after.name);
        match change {
            TermField::Parent { old, new: 0 } => {
                format!("Category {name} (ID {}) moved to top level from parent ID {old}", after.id)
            }
            TermField::Parent { new, .. } => {
                let parent = self.directory.term(*new, Some(&after.taxonomy));
                let parent_link = parent.as_ref().and_then(|p| self.term_link(p));
                let parent_name = parent
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| format!("#{new}"));
                format!(
                    "Category {name} (ID {}) assigned as child of {} (ID {new})",
                    after.id,
                    markup::bold_link(parent_link.as_deref(), &parent_name)
                )
            }
            TermField::Name { old, .. } => format!(
                "Taxonomy name changed from {} to {name} (ID {})",
                markup::bold(old),
                after.id
            ),
            TermField::Slug { old, new } => format!(
                "Slug changed for {name} (ID {}): {} → {}",
                after.id,
                markup::bold(old),
                markup::bold(new)
            ),
            TermField::Description { old, new } => format!(
                "Description updated for {name} (ID {}){BR}<b>Old:</b> {}{BR}<b>New:</b> {}",
                after.id,
                markup::or_empty_quotes(old),
                markup::or_empty_quotes(new)
            ),
        }
    }

    fn edited(
        &self,
        term_id: u64,
        taxonomy: &str,
        request: &mut RequestContext,
    ) -> Option<AuditEntry> {
        let before = request.pending.term_edits.take(term_id)?;
        let after = self.directory.term(term_id, Some(taxonomy))?;

        let changes = term_field_changes(&before, &after);
        if changes.is_empty() {
            return None;
        }

        let link = self.term_link(&after);
        let message = changes
            .iter()
            .map(|c| self.describe(c, &after, link.as_deref()))
            .collect::<Vec<_>>()
            .join(BR);

        Some(request.entry(ObjectType::Taxonomy, Severity::Notice, EventType::Modified, message))
    }

    fn capture_before_delete(&self, term_id: u64, taxonomy: &str, request: &mut RequestContext) {
        if let Some(term) = self.directory.term(term_id, Some(taxonomy)) {
            request.pending.term_deletes.capture(term_id, term);
        }
    }

    fn deleted(
        &self,
        term_id: u64,
        deleted_term: Option<&Term>,
        request: &mut RequestContext,
    ) -> Option<AuditEntry> {
        let term = request
            .pending
            .term_deletes
            .take(term_id)
            .or_else(|| deleted_term.cloned())?;

        let message = [
            "Taxonomy term deleted.".to_string(),
            markup::labelled("Name", &term.name),
            markup::labelled("ID", &term_id.to_string()),
        ]
        .join(BR);

        Some(request.entry(ObjectType::Taxonomy, Severity::Warning, EventType::Deleted, message))
    }

    fn term_names(&self, ids: impl IntoIterator<Item = u64>, taxonomy: &str) -> Vec<String> {
        ids.into_iter()
            .filter_map(|id| self.directory.term(id, Some(taxonomy)))
            .map(|t| t.name)
            .collect()
    }

    fn assigned(
        &self,
        object_id: u64,
        taxonomy: &str,
        taxonomy_ids: &[u64],
        old_taxonomy_ids: &[u64],
        request: &RequestContext,
    ) -> Option<AuditEntry> {
        let post = self.directory.post(object_id)?;
        if post.is_revision_or_autosave() {
            return None;
        }

        let new_ids = self.directory.term_ids_for(taxonomy_ids);
        let old_ids = self.directory.term_ids_for(old_taxonomy_ids);
        let diff = TermSetDiff::between(&old_ids, &new_ids);
        if diff.is_empty() {
            return None;
        }

        let mut lines = Vec::new();
        let added = self.term_names(diff.added.iter().copied(), taxonomy);
        if !added.is_empty() {
            lines.push(format!("{} added to the post.", markup::bold(&added.join(", "))));
        }
        let removed = self.term_names(diff.removed.iter().copied(), taxonomy);
        if !removed.is_empty() {
            lines.push(format!(
                "{} removed from the post.",
                markup::bold(&removed.join(", "))
            ));
        }
        // Terms can vanish mid-cascade; fall back to ids so the change is not lost.
        if added.is_empty() && removed.is_empty() {
            debug!(object_id, taxonomy, "assigned terms no longer resolve");
            let ids = diff
                .added
                .iter()
                .chain(diff.removed.iter())
                .map(u64::to_string)
                .collect::<Vec<_>>();
            lines.push(format!("Term IDs {} changed on the post.", markup::bold(&ids.join(", "))));
        }

        let mut details = [
            markup::labelled("Taxonomy", taxonomy),
            markup::labelled("Post Title", &post.title),
            markup::labelled("Post ID", &object_id.to_string()),
        ]
        .join(BR);
        if let Some(link) = self.directory.edit_post_link(object_id) {
            details.push_str(BR);
            details.push_str(&markup::link(&link, "View post in editor"));
        }
        lines.push(details);

        Some(request.entry(
            ObjectType::Taxonomy,
            Severity::Notice,
            EventType::Assigned,
            lines.join(BR),
        ))
    }

    fn capture_fields(&self, owner: &FieldOwner, request: &mut RequestContext) {
        let FieldOwner::Term(term_id) = owner else {
            return;
        };
        let fields = self.directory.custom_fields(owner);
        request.pending.term_fields.capture(*term_id, fields);
    }

    fn fields_saved(&self, owner: &FieldOwner, request: &mut RequestContext) -> Option<AuditEntry> {
        let FieldOwner::Term(term_id) = owner else {
            return None;
        };
        let old = request.pending.term_fields.take(*term_id).unwrap_or_default();
        let term = self.directory.term(*term_id, None)?;

        let new = self.directory.custom_fields(owner);
        if new.is_empty() {
            return None;
        }

        let changes = diff_fields(&old, &new);
        if changes.is_empty() {
            return None;
        }

        let link = self.term_link(&term);
        let name = markup::bold_link(link.as_deref(), &term.name);
        let blocks = changes
            .iter()
            .map(|change| {
                let label = self
                    .directory
                    .field_label(owner, &change.key)
                    .unwrap_or_else(|| change.key.clone());
                format!(
                    "Field {} updated for taxonomy {name} (ID {term_id}){BR}<b>Old:</b> {}{BR}<b>New:</b> {}",
                    markup::bold(&label),
                    render_value(change.old.as_ref()),
                    render_value(Some(&change.new)),
                )
            })
            .collect::<Vec<_>>();
        let separator = format!("{BR}{BR}");

        Some(request.entry(
            ObjectType::Taxonomy,
            Severity::Notice,
            EventType::Modified,
            blocks.join(separator.as_str()),
        ))
    }
}

impl Subscriber for TaxonomyLifecycleEngine {
    fn name(&self) -> &'static str {
        "taxonomy"
    }

    fn subscriptions(&self) -> &'static [NotificationKind] {
        &[
            NotificationKind::TermCreated,
            NotificationKind::TermBeforeEdit,
            NotificationKind::TermEdited,
            NotificationKind::TermBeforeDelete,
            NotificationKind::TermDeleted,
            NotificationKind::ObjectTermsSet,
            NotificationKind::CustomFieldsBeforeSave,
            NotificationKind::CustomFieldsSaved,
        ]
    }

    fn handle(
        &self,
        notification: &Notification,
        request: &mut RequestContext,
    ) -> Vec<AuditEntry> {
        let entry = match notification {
            Notification::TermCreated {
                term_id, taxonomy, ..
            } => self.created(*term_id, taxonomy, request),
            Notification::TermBeforeEdit {
                term_id, taxonomy, ..
            } => {
                self.capture_before_edit(*term_id, taxonomy, request);
                None
            }
            Notification::TermEdited {
                term_id, taxonomy, ..
            } => self.edited(*term_id, taxonomy, request),
            Notification::TermBeforeDelete { term_id, taxonomy } => {
                self.capture_before_delete(*term_id, taxonomy, request);
                None
            }
            Notification::TermDeleted {
                term_id,
                deleted_term,
                ..
            } => self.deleted(*term_id, deleted_term.as_ref(), request),
            Notification::ObjectTermsSet {
                object_id,
                taxonomy,
                taxonomy_ids,
                old_taxonomy_ids,
            } => self.assigned(*object_id, taxonomy, taxonomy_ids, old_taxonomy_ids, request),
            Notification::CustomFieldsBeforeSave { owner } => {
                self.capture_fields(owner, request);
                None
            }
            Notification::CustomFieldsSaved { owner } => self.fields_saved(owner, request),
            _ => None,
        };
        entry.into_iter().collect()
    }
}
