use std::collections::BTreeSet;

/// Classification of a featured-asset reference across one save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeaturedAssetChange {
    /// Nothing to log: unset on both sides, or the same asset.
    Unchanged,
    Assigned { new: u64 },
    Removed { old: u64 },
    Modified { old: u64, new: u64 },
}

impl FeaturedAssetChange {
    /// Classify a before/after pair. `None` and `Some(0)` both mean unset.
    pub fn classify(old: Option<u64>, new: Option<u64>) -> Self {
        let old = old.filter(|id| *id != 0);
        let new = new.filter(|id| *id != 0);
        match (old, new) {
            (None, None) => Self::Unchanged,
            (Some(old), None) => Self::Removed { old },
            (None, Some(new)) => Self::Assigned { new },
            (Some(old), Some(new)) if old == new => Self::Unchanged,
            (Some(old), Some(new)) => Self::Modified { old, new },
        }
    }
}

/// Tracked term fields compared across an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermField {
    Parent { old: u64, new: u64 },
    Name { old: String, new: String },
    Slug { old: String, new: String },
    Description { old: String, new: String },
}

/// Term ids added to and removed from a content object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TermSetDiff {
    pub added: BTreeSet<u64>,
    pub removed: BTreeSet<u64>,
}

impl TermSetDiff {
    /// `added = new - old`, `removed = old - new`.
    pub fn between(old: &[u64], new: &[u64]) -> Self {
        let old: BTreeSet<u64> = old.iter().copied().collect();
        let new: BTreeSet<u64> = new.iter().copied().collect();
        Self {
            added: new.difference(&old).copied().collect(),
            removed: old.difference(&new).copied().collect(),
        }
    }

    /// Returns true if nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// A single custom-field value that differs between two saves.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub key: String,
    pub old: Option<serde_json::Value>,
    pub new: serde_json::Value,
}
