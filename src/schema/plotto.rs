use rustc_hash::FxHashMap;

use super::character::{Character, Designation};
use super::conflict::{Conflict, ConflictId};
use super::record::{Outcome, Predicate, Subject};

/// The parsed corpus: every record kind in canonical corpus order, with
/// lookup indices by id, number or designation.
///
/// Built once and shared by reference afterwards. Insertion keeps the first
/// record for any key, so keys are unique within each collection.
#[derive(Debug, Clone, Default)]
pub struct PlottoData {
    characters: Vec<Character>,
    subjects: Vec<Subject>,
    predicates: Vec<Predicate>,
    outcomes: Vec<Outcome>,
    conflicts: Vec<Conflict>,
    character_index: FxHashMap<Designation, usize>,
    subject_index: FxHashMap<u32, usize>,
    predicate_index: FxHashMap<u32, usize>,
    outcome_index: FxHashMap<u32, usize>,
    conflict_index: FxHashMap<ConflictId, usize>,
}

impl PlottoData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and drops the record) if the designation is taken.
    pub fn insert_character(&mut self, character: Character) -> bool {
        if self.character_index.contains_key(&character.designation) {
            return false;
        }
        self.character_index
            .insert(character.designation.clone(), self.characters.len());
        self.characters.push(character);
        true
    }

    pub fn insert_subject(&mut self, subject: Subject) -> bool {
        if self.subject_index.contains_key(&subject.number) {
            return false;
        }
        self.subject_index.insert(subject.number, self.subjects.len());
        self.subjects.push(subject);
        true
    }

    pub fn insert_predicate(&mut self, predicate: Predicate) -> bool {
        if self.predicate_index.contains_key(&predicate.number) {
            return false;
        }
        self.predicate_index
            .insert(predicate.number, self.predicates.len());
        self.predicates.push(predicate);
        true
    }

    pub fn insert_outcome(&mut self, outcome: Outcome) -> bool {
        if self.outcome_index.contains_key(&outcome.number) {
            return false;
        }
        self.outcome_index.insert(outcome.number, self.outcomes.len());
        self.outcomes.push(outcome);
        true
    }

    pub fn insert_conflict(&mut self, conflict: Conflict) -> bool {
        if self.conflict_index.contains_key(&conflict.id) {
            return false;
        }
        self.conflict_index
            .insert(conflict.id.clone(), self.conflicts.len());
        self.conflicts.push(conflict);
        true
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn character(&self, designation: &str) -> Option<&Character> {
        self.character_index
            .get(designation)
            .map(|&i| &self.characters[i])
    }

    pub fn subject(&self, number: u32) -> Option<&Subject> {
        self.subject_index.get(&number).map(|&i| &self.subjects[i])
    }

    pub fn predicate(&self, number: u32) -> Option<&Predicate> {
        self.predicate_index
            .get(&number)
            .map(|&i| &self.predicates[i])
    }

    pub fn outcome(&self, number: u32) -> Option<&Outcome> {
        self.outcome_index.get(&number).map(|&i| &self.outcomes[i])
    }

    pub fn conflict(&self, id: &str) -> Option<&Conflict> {
        self.conflict_index.get(id).map(|&i| &self.conflicts[i])
    }

    /// Designation -> description table used by the reference resolver.
    pub fn character_descriptions(&self) -> FxHashMap<&str, &str> {
        self.characters
            .iter()
            .map(|c| (c.designation.as_str(), c.description.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
            && self.subjects.is_empty()
            && self.predicates.is_empty()
            && self.outcomes.is_empty()
            && self.conflicts.is_empty()
    }
}
