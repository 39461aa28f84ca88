use serde::{Deserialize, Serialize};

/// Post type the host uses for stored revisions.
pub const REVISION_TYPE: &str = "revision";

/// A content item as the host platform reports it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: u64,
    pub post_type: String,
    pub status: String,
    pub title: String,
    pub excerpt: String,
    /// Permalink slug.
    pub slug: String,
    /// Owning post for revisions, 0 otherwise.
    pub parent: u64,
}

impl Post {
    pub fn is_revision(&self) -> bool {
        self.post_type == REVISION_TYPE
    }

    /// Autosaves are revisions named `<parent>-autosave-v<n>`.
    pub fn is_autosave(&self) -> bool {
        self.is_revision() && self.slug.contains("-autosave")
    }

    /// Revisions and autosaves are never audited on their own.
    pub fn is_revision_or_autosave(&self) -> bool {
        self.is_revision() || self.is_autosave()
    }
}

/// A taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Term {
    pub id: u64,
    /// Term-taxonomy identifier; distinct from `id`.
    pub taxonomy_id: u64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    /// 0 for top-level terms.
    pub parent: u64,
    pub description: String,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub email: String,
    pub roles: Vec<String>,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// First and last name joined and trimmed, `None` when both are blank.
    pub fn full_name(&self) -> Option<String> {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        if first.is_empty() && last.is_empty() {
            return None;
        }
        Some(format!("{first} {last}").trim().to_string())
    }
}

/// A media attachment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub id: u64,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            first_name: first.into(),
            last_name: last.into(),
            ..User::default()
        }
    }

    #[test]
    fn full_name_joins_and_trims() {
        assert_eq!(user(" Ada ", "Lovelace").full_name().as_deref(), Some("Ada Lovelace"));
        assert_eq!(user("Ada", "").full_name().as_deref(), Some("Ada"));
        assert_eq!(user("", "Lovelace").full_name().as_deref(), Some("Lovelace"));
    }

    #[test]
    fn full_name_omitted_when_blank() {
        assert_eq!(user("", "").full_name(), None);
        assert_eq!(user("  ", "\t").full_name(), None);
    }

    #[test]
    fn autosave_detection() {
        let autosave = Post {
            post_type: "revision".into(),
            slug: "42-autosave-v1".into(),
            ..Post::default()
        };
        let revision = Post {
            post_type: "revision".into(),
            slug: "42-revision-v1".into(),
            ..Post::default()
        };
        let page = Post {
            post_type: "page".into(),
            slug: "about-autosave".into(),
            ..Post::default()
        };

        assert!(autosave.is_autosave());
        assert!(revision.is_revision() && !revision.is_autosave());
        assert!(!page.is_revision_or_autosave());
    }
}
