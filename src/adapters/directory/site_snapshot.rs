use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::errors::{LogManagerError, Result};
use crate::core::models::entities::{Attachment, Post, Term, User};
use crate::core::models::notification::FieldOwner;
use crate::core::traits::directory::{ContentDirectory, FieldMap};

/// Serialized state of a host site: what `replay --site` loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteData {
    /// Base URL used to build edit links. Empty means no links.
    pub site_url: String,
    pub posts: Vec<Post>,
    pub terms: Vec<Term>,
    pub users: Vec<User>,
    pub attachments: Vec<Attachment>,
    /// Post id to featured attachment id.
    pub featured: BTreeMap<u64, u64>,
    /// Custom-field values keyed by owner (`"term_12"`, `"42"`).
    pub custom_fields: BTreeMap<String, FieldMap>,
    /// Field key to human label.
    pub field_labels: BTreeMap<String, String>,
}

/// A mutation applied to the site between notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum SiteChange {
    UpsertPost { post: Post },
    RemovePost { post_id: u64 },
    UpsertTerm { term: Term },
    RemoveTerm { term_id: u64 },
    SetFeaturedAsset {
        post_id: u64,
        #[serde(default)]
        attachment_id: Option<u64>,
    },
    SetCustomFields { owner: FieldOwner, fields: FieldMap },
    UpsertUser { user: User },
}

/// In-memory [`ContentDirectory`] over a mutable [`SiteData`].
#[derive(Debug, Default)]
pub struct SiteSnapshot {
    data: RwLock<SiteData>,
}

fn upsert<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

impl SiteSnapshot {
    pub fn new(data: SiteData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Load a site from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let data: SiteData =
            serde_json::from_str(&content).map_err(|e| LogManagerError::ReplayError {
                detail: format!("cannot parse site file {}: {e}", path.display()),
            })?;
        Ok(Self::new(data))
    }

    pub fn apply(&self, change: SiteChange) {
        let mut data = self.data.write();
        match change {
            SiteChange::UpsertPost { post } => {
                let id = post.id;
                upsert(&mut data.posts, post, |p| p.id == id);
            }
            SiteChange::RemovePost { post_id } => {
                data.posts.retain(|p| p.id != post_id);
                data.featured.remove(&post_id);
            }
            SiteChange::UpsertTerm { term } => {
                let id = term.id;
                upsert(&mut data.terms, term, |t| t.id == id);
            }
            SiteChange::RemoveTerm { term_id } => data.terms.retain(|t| t.id != term_id),
            SiteChange::SetFeaturedAsset {
                post_id,
                attachment_id,
            } => match attachment_id.filter(|id| *id != 0) {
                Some(id) => {
                    data.featured.insert(post_id, id);
                }
                None => {
                    data.featured.remove(&post_id);
                }
            },
            SiteChange::SetCustomFields { owner, fields } => {
                data.custom_fields.insert(owner.into(), fields);
            }
            SiteChange::UpsertUser { user } => {
                let id = user.id;
                upsert(&mut data.users, user, |u| u.id == id);
            }
        }
    }

    fn admin_url(&self, path_and_query: &str) -> Option<String> {
        let data = self.data.read();
        let base = data.site_url.trim_end_matches('/');
        (!base.is_empty()).then(|| format!("{base}/wp-admin/{path_and_query}"))
    }
}

impl ContentDirectory for SiteSnapshot {
    fn post(&self, id: u64) -> Option<Post> {
        self.data.read().posts.iter().find(|p| p.id == id).cloned()
    }

    fn term(&self, id: u64, taxonomy: Option<&str>) -> Option<Term> {
        self.data
            .read()
            .terms
            .iter()
            .find(|t| t.id == id && taxonomy.is_none_or(|tax| t.taxonomy == tax))
            .cloned()
    }

    fn term_ids_for(&self, taxonomy_ids: &[u64]) -> Vec<u64> {
        let data = self.data.read();
        taxonomy_ids
            .iter()
            .filter_map(|tt| data.terms.iter().find(|t| t.taxonomy_id == *tt).map(|t| t.id))
            .collect()
    }

    fn user(&self, id: u64) -> Option<User> {
        self.data.read().users.iter().find(|u| u.id == id).cloned()
    }

    fn user_by_login(&self, login: &str) -> Option<User> {
        self.data.read().users.iter().find(|u| u.login == login).cloned()
    }

    fn user_by_email(&self, email: &str) -> Option<User> {
        self.data
            .read()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    fn featured_asset(&self, post_id: u64) -> Option<u64> {
        self.data.read().featured.get(&post_id).copied()
    }

    fn attachment_url(&self, attachment_id: u64) -> Option<String> {
        self.data
            .read()
            .attachments
            .iter()
            .find(|a| a.id == attachment_id)
            .map(|a| a.url.clone())
            .filter(|url| !url.is_empty())
    }

    fn custom_fields(&self, owner: &FieldOwner) -> FieldMap {
        let key: String = owner.clone().into();
        self.data
            .read()
            .custom_fields
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    fn field_label(&self, _owner: &FieldOwner, key: &str) -> Option<String> {
        self.data.read().field_labels.get(key).cloned()
    }

    fn edit_post_link(&self, post_id: u64) -> Option<String> {
        self.admin_url(&format!("post.php?post={post_id}&action=edit"))
    }

    fn edit_term_link(&self, term_id: u64, taxonomy: &str) -> Option<String> {
        self.admin_url(&format!("term.php?taxonomy={taxonomy}&tag_ID={term_id}"))
    }
}
