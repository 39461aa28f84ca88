use serde::{Deserialize, Serialize};

use crate::core::models::entities::{Post, Term};

/// Metadata key under which the host stores a post's featured asset.
pub const FEATURED_ASSET_META_KEY: &str = "_thumbnail_id";

/// Owner of a custom-field group, as the field plugin addresses it
/// (`"term_12"`, `"42"`, `"options"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldOwner {
    Term(u64),
    Post(u64),
    Other(String),
}

impl Default for FieldOwner {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for FieldOwner {
    fn from(raw: String) -> Self {
        if let Some(id) = raw.strip_prefix("term_").and_then(|s| s.parse().ok()) {
            return Self::Term(id);
        }
        match raw.parse() {
            Ok(id) => Self::Post(id),
            Err(_) => Self::Other(raw),
        }
    }
}

impl From<FieldOwner> for String {
    fn from(owner: FieldOwner) -> Self {
        match owner {
            FieldOwner::Term(id) => format!("term_{id}"),
            FieldOwner::Post(id) => id.to_string(),
            FieldOwner::Other(raw) => raw,
        }
    }
}

/// Which metadata mutation fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaOperation {
    Added,
    Updated,
    Deleted,
}

/// Result the authentication pipeline reached before the audit hook ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    Success,
    Failure,
}

/// One lifecycle notification from the host platform, typed per kind.
///
/// Every field a handler reads is declared here; anything the host could
/// leave out is an `Option` or has a serde default so partial payloads still
/// deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum Notification {
    PostStatusTransition {
        #[serde(default)]
        new_status: String,
        #[serde(default)]
        old_status: String,
        post: Option<Post>,
    },
    PostBeforeDelete {
        #[serde(default)]
        post_id: u64,
    },
    PostUpdated {
        #[serde(default)]
        post_id: u64,
        before: Option<Post>,
        after: Option<Post>,
    },
    PostBeforeUpdate {
        #[serde(default)]
        post_id: u64,
    },
    PostSaved {
        #[serde(default)]
        post_id: u64,
        post: Option<Post>,
        #[serde(default)]
        update: bool,
    },
    PostMetaChanged {
        operation: MetaOperation,
        #[serde(default)]
        meta_id: u64,
        #[serde(default)]
        post_id: u64,
        #[serde(default)]
        meta_key: String,
        #[serde(default)]
        meta_value: Option<String>,
    },
    TermCreated {
        #[serde(default)]
        term_id: u64,
        #[serde(default)]
        taxonomy_id: u64,
        #[serde(default)]
        taxonomy: String,
    },
    TermBeforeEdit {
        #[serde(default)]
        term_id: u64,
        #[serde(default)]
        taxonomy_id: u64,
        #[serde(default)]
        taxonomy: String,
    },
    TermEdited {
        #[serde(default)]
        term_id: u64,
        #[serde(default)]
        taxonomy_id: u64,
        #[serde(default)]
        taxonomy: String,
    },
    TermBeforeDelete {
        #[serde(default)]
        term_id: u64,
        #[serde(default)]
        taxonomy: String,
    },
    TermDeleted {
        #[serde(default)]
        term_id: u64,
        #[serde(default)]
        taxonomy_id: u64,
        #[serde(default)]
        taxonomy: String,
        #[serde(default)]
        deleted_term: Option<Term>,
    },
    ObjectTermsSet {
        #[serde(default)]
        object_id: u64,
        #[serde(default)]
        taxonomy: String,
        #[serde(default)]
        taxonomy_ids: Vec<u64>,
        #[serde(default)]
        old_taxonomy_ids: Vec<u64>,
    },
    CustomFieldsBeforeSave {
        #[serde(default)]
        owner: FieldOwner,
    },
    CustomFieldsSaved {
        #[serde(default)]
        owner: FieldOwner,
    },
    LoginCookieIssued {
        #[serde(default)]
        user_id: u64,
    },
    Logout {
        #[serde(default)]
        user_id: u64,
    },
    AuthenticationAttempt {
        #[serde(default)]
        username: String,
        outcome: AuthOutcome,
    },
}

/// Discriminant of a `Notification`, used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    PostStatusTransition,
    PostBeforeDelete,
    PostUpdated,
    PostBeforeUpdate,
    PostSaved,
    PostMetaChanged,
    TermCreated,
    TermBeforeEdit,
    TermEdited,
    TermBeforeDelete,
    TermDeleted,
    ObjectTermsSet,
    CustomFieldsBeforeSave,
    CustomFieldsSaved,
    LoginCookieIssued,
    Logout,
    AuthenticationAttempt,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::PostStatusTransition { .. } => NotificationKind::PostStatusTransition,
            Self::PostBeforeDelete { .. } => NotificationKind::PostBeforeDelete,
            Self::PostUpdated { .. } => NotificationKind::PostUpdated,
            Self::PostBeforeUpdate { .. } => NotificationKind::PostBeforeUpdate,
            Self::PostSaved { .. } => NotificationKind::PostSaved,
            Self::PostMetaChanged { .. } => NotificationKind::PostMetaChanged,
            Self::TermCreated { .. } => NotificationKind::TermCreated,
            Self::TermBeforeEdit { .. } => NotificationKind::TermBeforeEdit,
            Self::TermEdited { .. } => NotificationKind::TermEdited,
            Self::TermBeforeDelete { .. } => NotificationKind::TermBeforeDelete,
            Self::TermDeleted { .. } => NotificationKind::TermDeleted,
            Self::ObjectTermsSet { .. } => NotificationKind::ObjectTermsSet,
            Self::CustomFieldsBeforeSave { .. } => NotificationKind::CustomFieldsBeforeSave,
            Self::CustomFieldsSaved { .. } => NotificationKind::CustomFieldsSaved,
            Self::LoginCookieIssued { .. } => NotificationKind::LoginCookieIssued,
            Self::Logout { .. } => NotificationKind::Logout,
            Self::AuthenticationAttempt { .. } => NotificationKind::AuthenticationAttempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_owner_parses_term_prefix() {
        assert_eq!(FieldOwner::from("term_12".to_string()), FieldOwner::Term(12));
        assert_eq!(FieldOwner::from("42".to_string()), FieldOwner::Post(42));
        assert_eq!(
            FieldOwner::from("term_abc".to_string()),
            FieldOwner::Other("term_abc".into())
        );
        assert_eq!(String::from(FieldOwner::Term(7)), "term_7");
    }

    #[test]
    fn notification_deserializes_by_hook_tag() {
        let json = r#"{"hook":"term_edited","term_id":5,"taxonomy":"category"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind(), NotificationKind::TermEdited);
        assert_eq!(
            n,
            Notification::TermEdited {
                term_id: 5,
                taxonomy_id: 0,
                taxonomy: "category".into(),
            }
        );
    }

    #[test]
    fn partial_payloads_fill_defaults() {
        let json = r#"{"hook":"logout"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n, Notification::Logout { user_id: 0 });

        let json = r#"{"hook":"custom_fields_saved","owner":"term_3"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(
            n,
            Notification::CustomFieldsSaved {
                owner: FieldOwner::Term(3)
            }
        );
    }

    #[test]
    fn missing_ids_and_names_default_to_empty() {
        let json = r#"{"hook":"post_status_transition","new_status":"publish"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(
            n,
            Notification::PostStatusTransition {
                new_status: "publish".into(),
                old_status: String::new(),
                post: None,
            }
        );

        let json = r#"{"hook":"custom_fields_before_save"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(
            n,
            Notification::CustomFieldsBeforeSave {
                owner: FieldOwner::Other(String::new())
            }
        );

        let json = r#"{"hook":"post_meta_changed","post_id":4}"#;
        assert!(serde_json::from_str::<Notification>(json).is_err());
    }
}
