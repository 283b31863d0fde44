use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Which side of a proposed edit a change represents.
/// A replacement is a Deletion immediately followed by an Addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Deletion,
    Addition,
}

impl ChangeKind {
    /// Id prefix: `del` or `add`.
    pub fn prefix(self) -> &'static str {
        match self {
            ChangeKind::Deletion => "del",
            ChangeKind::Addition => "add",
        }
    }
}

/// Transient UI status of a change. Never serialized back into the document:
/// the document only ever holds pending markup or resolved plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Edited,
}

/// One proposed edit discovered by tokenizing a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// `del-N` / `add-N`; positional, only valid for the pass that produced it.
    pub id: String,
    pub kind: ChangeKind,
    /// Exact substring of the document, used as the substitution anchor.
    pub raw_markup: String,
    /// Inner text with all wrappers removed.
    pub display_text: String,
    /// Byte range of `raw_markup` in the document it was tokenized from.
    pub span: Range<usize>,
}

/// Side table from change id to its change, rebuilt on every tokenization pass.
/// Iteration order is document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRegistry {
    changes: Vec<Change>,
    by_id: HashMap<String, usize>,
}

impl ChangeRegistry {
    pub(crate) fn from_changes(mut changes: Vec<Change>) -> Self {
        changes.sort_by_key(|c| c.span.start);
        let by_id = changes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Self { changes, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Change> {
        self.by_id.get(id).map(|&i| &self.changes[i])
    }

    /// Raw markup registered for `id`.
    pub fn raw_markup(&self, id: &str) -> Option<&str> {
        self.get(id).map(|c| c.raw_markup.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(move |c| c.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(id: &str, kind: ChangeKind, start: usize) -> Change {
        Change {
            id: id.to_string(),
            kind,
            raw_markup: format!("<{id}>"),
            display_text: id.to_string(),
            span: start..start + id.len() + 2,
        }
    }

    #[test]
    fn test_registry_orders_by_position() {
        let registry = ChangeRegistry::from_changes(vec![
            change("del-0", ChangeKind::Deletion, 40),
            change("add-1", ChangeKind::Addition, 10),
        ]);
        let ids: Vec<_> = registry.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["add-1", "del-0"]);
        assert_eq!(registry.raw_markup("del-0"), Some("<del-0>"));
        assert!(registry.get("add-9").is_none());
    }

    #[test]
    fn test_of_kind_filters() {
        let registry = ChangeRegistry::from_changes(vec![
            change("del-0", ChangeKind::Deletion, 0),
            change("add-1", ChangeKind::Addition, 20),
            change("add-2", ChangeKind::Addition, 40),
        ]);
        assert_eq!(registry.of_kind(ChangeKind::Addition).count(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_kind_prefix() {
        assert_eq!(ChangeKind::Deletion.prefix(), "del");
        assert_eq!(ChangeKind::Addition.prefix(), "add");
    }
}
