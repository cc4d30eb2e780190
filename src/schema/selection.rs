use serde::{Deserialize, Serialize};
use std::fmt;

use super::character::Designation;
use super::conflict::ConflictId;

/// The five selectable record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Characters,
    Subjects,
    Predicates,
    Conflicts,
    Outcomes,
}

impl Category {
    pub fn parse(value: &str) -> Option<Category> {
        match value.trim().to_ascii_lowercase().as_str() {
            "characters" | "character" => Some(Self::Characters),
            "subjects" | "subject" => Some(Self::Subjects),
            "predicates" | "predicate" => Some(Self::Predicates),
            "conflicts" | "conflict" => Some(Self::Conflicts),
            "outcomes" | "outcome" => Some(Self::Outcomes),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::Subjects => "subjects",
            Self::Predicates => "predicates",
            Self::Conflicts => "conflicts",
            Self::Outcomes => "outcomes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The mutable state of one authoring session.
///
/// `conflicts` is in narrative order (lead-up -> conflict -> carry-on), not
/// in the order the ids were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedElements {
    pub characters: Vec<Designation>,
    pub subjects: Vec<u32>,
    pub predicate: Option<u32>,
    pub conflicts: Vec<ConflictId>,
    pub outcome: Option<u32>,
}

impl SelectedElements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
            && self.subjects.is_empty()
            && self.predicate.is_none()
            && self.conflicts.is_empty()
            && self.outcome.is_none()
    }

    pub fn has_conflict(&self, id: &str) -> bool {
        self.conflicts.iter().any(|c| c.as_str() == id)
    }

    /// The most recently placed conflict, i.e. the last in sequence.
    pub fn last_conflict(&self) -> Option<&ConflictId> {
        self.conflicts.last()
    }

    /// The predicate is read-only while any conflict is selected.
    pub fn predicate_locked(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_accepts_singular_and_plural() {
        assert_eq!(Category::parse("conflict"), Some(Category::Conflicts));
        assert_eq!(Category::parse("Outcomes"), Some(Category::Outcomes));
        assert_eq!(Category::parse("plot"), None);
    }

    #[test]
    fn predicate_lock_follows_conflicts() {
        let mut selection = SelectedElements::new();
        assert!(selection.is_empty());
        assert!(!selection.predicate_locked());
        selection.conflicts.push(ConflictId::from("1a"));
        assert!(selection.predicate_locked());
        assert!(selection.has_conflict("1a"));
        assert_eq!(selection.last_conflict().map(|c| c.as_str()), Some("1a"));
    }
}
