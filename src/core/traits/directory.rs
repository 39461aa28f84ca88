use std::collections::BTreeMap;

use crate::core::models::entities::{Post, Term, User};
use crate::core::models::notification::FieldOwner;

/// Custom-field values keyed by field name.
pub type FieldMap = BTreeMap<String, serde_json::Value>;

/// Port for everything the engines look up on the host platform.
///
/// Lookups never fail loudly: an entity that cannot be resolved is `None`
/// and the caller skips the entry.
pub trait ContentDirectory: Send + Sync {
    fn post(&self, id: u64) -> Option<Post>;

    /// Resolve a term. `taxonomy` narrows the lookup when the caller knows it.
    fn term(&self, id: u64, taxonomy: Option<&str>) -> Option<Term>;

    /// Map term-taxonomy ids to term ids. Unknown ids are dropped.
    fn term_ids_for(&self, taxonomy_ids: &[u64]) -> Vec<u64>;

    fn user(&self, id: u64) -> Option<User>;

    fn user_by_login(&self, login: &str) -> Option<User>;

    fn user_by_email(&self, email: &str) -> Option<User>;

    /// Current featured-asset attachment id for a post, if one is set.
    fn featured_asset(&self, post_id: u64) -> Option<u64>;

    fn attachment_url(&self, attachment_id: u64) -> Option<String>;

    /// Current custom-field values for an owner. Empty when none exist.
    fn custom_fields(&self, owner: &FieldOwner) -> FieldMap;

    /// Human label of a custom field, if the schema defines one.
    fn field_label(&self, owner: &FieldOwner, key: &str) -> Option<String>;

    fn edit_post_link(&self, post_id: u64) -> Option<String>;

    fn edit_term_link(&self, term_id: u64, taxonomy: &str) -> Option<String>;
}
