//! Selection state machine over `SelectedElements`, plus a random selector.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::RandomSelectionConfig;
use crate::core::graph::ConflictGraph;
use crate::core::recommend::{Placement, RelatedConflictResolver};
use crate::schema::plotto::PlottoData;
use crate::schema::selection::{Category, SelectedElements};

/// Why a selection request left the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownId,
    /// The predicate cannot change while conflicts are selected.
    PredicateLocked,
}

/// The effect of one selection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Added,
    /// A lead-up placed in front of the conflict it leads to.
    Inserted { index: usize },
    Removed,
    Replaced { previous: u32 },
    Cleared,
    Ignored(IgnoreReason),
}

pub struct ElementSelector<'a> {
    data: &'a PlottoData,
    recommender: RelatedConflictResolver<'a>,
}

impl<'a> ElementSelector<'a> {
    pub fn new(data: &'a PlottoData) -> Self {
        Self {
            data,
            recommender: RelatedConflictResolver::new(ConflictGraph::new(data)),
        }
    }

    /// Toggle `id` within `category`.
    ///
    /// Characters, subjects and conflicts are multi-select; picking a
    /// selected value again removes it. Predicate and outcome hold one value.
    pub fn select(
        &self,
        selection: &mut SelectedElements,
        category: Category,
        id: &str,
    ) -> SelectionChange {
        let change = match category {
            Category::Characters => self.toggle_character(selection, id),
            Category::Subjects => match self.number(id, |n| self.data.subject(n).is_some()) {
                Some(n) => toggle(&mut selection.subjects, n),
                None => SelectionChange::Ignored(IgnoreReason::UnknownId),
            },
            Category::Predicates => {
                if selection.predicate_locked() {
                    SelectionChange::Ignored(IgnoreReason::PredicateLocked)
                } else {
                    match self.number(id, |n| self.data.predicate(n).is_some()) {
                        Some(n) => single(&mut selection.predicate, n),
                        None => SelectionChange::Ignored(IgnoreReason::UnknownId),
                    }
                }
            }
            Category::Outcomes => match self.number(id, |n| self.data.outcome(n).is_some()) {
                Some(n) => single(&mut selection.outcome, n),
                None => SelectionChange::Ignored(IgnoreReason::UnknownId),
            },
            Category::Conflicts => self.toggle_conflict(selection, id),
        };
        tracing::debug!(category = %category, id, ?change, "selection");
        change
    }

    fn number(&self, id: &str, known: impl Fn(u32) -> bool) -> Option<u32> {
        id.trim().parse::<u32>().ok().filter(|&n| known(n))
    }

    fn toggle_character(&self, selection: &mut SelectedElements, id: &str) -> SelectionChange {
        let Some(character) = self.data.character(id.trim()) else {
            return SelectionChange::Ignored(IgnoreReason::UnknownId);
        };
        toggle(&mut selection.characters, character.designation.clone())
    }

    fn toggle_conflict(&self, selection: &mut SelectedElements, id: &str) -> SelectionChange {
        let id = id.trim();
        if let Some(pos) = selection.conflicts.iter().position(|c| c.as_str() == id) {
            selection.conflicts.remove(pos);
            return SelectionChange::Removed;
        }
        match self.recommender.accept(selection, id) {
            Placement::Appended(_) => SelectionChange::Added,
            Placement::Inserted(index) => SelectionChange::Inserted { index },
            // Already-selected ids were toggled off above.
            Placement::AlreadySelected | Placement::Unknown => {
                SelectionChange::Ignored(IgnoreReason::UnknownId)
            }
        }
    }

    /// A complete random selection: one subject, one predicate, a conflict
    /// chain grown through recommendations, one outcome, and the characters
    /// those conflicts name.
    pub fn random_selection<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        config: &RandomSelectionConfig,
    ) -> SelectedElements {
        let mut selection = SelectedElements::new();

        if let Some(subject) = self.data.subjects().choose(rng) {
            selection.subjects.push(subject.number);
        }
        // Set before any conflict so the predicate lock never applies.
        selection.predicate = self.data.predicates().choose(rng).map(|p| p.number);

        let start = self
            .recommender
            .candidates(&selection)
            .choose(rng)
            .map(|c| c.id.clone())
            .or_else(|| self.data.conflicts().choose(rng).map(|c| c.id.clone()));

        if let Some(start) = start {
            self.recommender.accept(&mut selection, start.as_str());
            for _ in 0..config.conflict_steps {
                let recommendations = self.recommender.recommend(&selection, rng);
                let Some(next) = recommendations.choose(rng) else {
                    break;
                };
                self.recommender.accept(&mut selection, next.id.as_str());
            }
        }

        selection.outcome = self.data.outcomes().choose(rng).map(|o| o.number);

        'conflicts: for id in &selection.conflicts {
            let Some(permutation) = self
                .data
                .conflict(id.as_str())
                .and_then(|c| c.first_permutation())
            else {
                continue;
            };
            for link in &permutation.character_links {
                if selection.characters.len() >= config.max_characters {
                    break 'conflicts;
                }
                if self.data.character(link.designation.as_str()).is_some()
                    && !selection.characters.contains(&link.designation)
                {
                    selection.characters.push(link.designation.clone());
                }
            }
        }

        tracing::debug!(
            subjects = selection.subjects.len(),
            conflicts = selection.conflicts.len(),
            characters = selection.characters.len(),
            "random selection"
        );
        selection
    }
}

fn toggle<T: PartialEq>(values: &mut Vec<T>, value: T) -> SelectionChange {
    match values.iter().position(|v| *v == value) {
        Some(pos) => {
            values.remove(pos);
            SelectionChange::Removed
        }
        None => {
            values.push(value);
            SelectionChange::Added
        }
    }
}

fn single(slot: &mut Option<u32>, value: u32) -> SelectionChange {
    match *slot {
        Some(current) if current == value => {
            *slot = None;
            SelectionChange::Cleared
        }
        Some(previous) => {
            *slot = Some(value);
            SelectionChange::Replaced { previous }
        }
        None => {
            *slot = Some(value);
            SelectionChange::Added
        }
    }
}

/// Apply one selection request and return the updated selection.
pub fn select_element(
    mut selection: SelectedElements,
    category: Category,
    id: &str,
    data: &PlottoData,
) -> SelectedElements {
    ElementSelector::new(data).select(&mut selection, category, id);
    selection
}
