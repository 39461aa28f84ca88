use std::collections::HashMap;

use crate::core::models::entities::Term;
use crate::core::traits::directory::FieldMap;

/// Term fields captured before an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSnapshot {
    pub name: String,
    pub slug: String,
    pub parent: u64,
    pub description: String,
}

impl From<&Term> for TermSnapshot {
    fn from(term: &Term) -> Self {
        Self {
            name: term.name.clone(),
            slug: term.slug.clone(),
            parent: term.parent,
            description: term.description.clone(),
        }
    }
}

/// At most one live snapshot per id.
#[derive(Debug)]
pub struct SnapshotSlot<T> {
    entries: HashMap<u64, T>,
}

impl<T> Default for SnapshotSlot<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> SnapshotSlot<T> {
    /// Store a snapshot, replacing any earlier one for the same id.
    pub fn capture(&mut self, id: u64, snapshot: T) {
        self.entries.insert(id, snapshot);
    }

    /// Remove and return the snapshot for `id`.
    pub fn take(&mut self, id: u64) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Before-state snapshots held for the duration of one request.
///
/// Each change category has its own slot, so a term edit and a term delete
/// for the same id never collide.
#[derive(Debug, Default)]
pub struct PendingStateBuffer {
    pub term_edits: SnapshotSlot<TermSnapshot>,
    pub term_deletes: SnapshotSlot<Term>,
    pub term_fields: SnapshotSlot<FieldMap>,
    /// `None` records "no featured asset before the save".
    pub featured_assets: SnapshotSlot<Option<u64>>,
}

impl PendingStateBuffer {
    /// Total live snapshots across all categories.
    pub fn len(&self) -> usize {
        self.term_edits.len()
            + self.term_deletes.len()
            + self.term_fields.len()
            + self.featured_assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_snapshot() {
        let mut slot = SnapshotSlot::default();
        slot.capture(4, "before");
        assert!(slot.contains(4));
        assert_eq!(slot.take(4), Some("before"));
        assert_eq!(slot.take(4), None);
        assert!(slot.is_empty());
    }

    #[test]
    fn capture_replaces_previous() {
        let mut slot = SnapshotSlot::default();
        slot.capture(1, 10);
        slot.capture(1, 20);
        assert_eq!(slot.len(), 1);
        assert_eq!(slot.take(1), Some(20));
    }

    #[test]
    fn categories_do_not_collide() {
        let mut buffer = PendingStateBuffer::default();
        buffer.term_edits.capture(
            9,
            TermSnapshot {
                name: "News".into(),
                slug: "news".into(),
                parent: 0,
                description: String::new(),
            },
        );
        buffer.term_deletes.capture(9, Term::default());
        buffer.featured_assets.capture(9, None);

        assert_eq!(buffer.len(), 3);
        assert!(buffer.term_deletes.take(9).is_some());
        assert!(buffer.term_edits.contains(9));
        assert_eq!(buffer.featured_assets.take(9), Some(None));
    }
}
