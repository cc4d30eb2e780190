//! Draft composition: renders a selection as a fixed-structure outline.
//!
//! Section order is fixed: characters, subjects, predicate, conflicts,
//! outcome, then the linked conflicts of each selected conflict. Empty
//! sections are left out. Conflicts always render their first permutation.

use crate::core::graph::ConflictGraph;
use crate::core::resolver::ReferenceResolver;
use crate::schema::character::{CharacterLink, Designation};
use crate::schema::conflict::{Conflict, ConflictLink, Relation};
use crate::schema::plotto::PlottoData;
use crate::schema::selection::SelectedElements;

/// Last line of every draft.
pub const END_OF_DRAFT: &str = "END OF DRAFT";

/// A composed draft plus what could not be resolved while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedDraft {
    pub text: String,
    /// Character links with no description, first-seen order.
    pub unresolved: Vec<Designation>,
    /// Selected or linked ids that were not in the corpus.
    pub skipped_references: usize,
}

pub struct StoryComposer<'a> {
    data: &'a PlottoData,
    graph: ConflictGraph<'a>,
    resolver: ReferenceResolver<'a>,
}

impl<'a> StoryComposer<'a> {
    pub fn new(data: &'a PlottoData) -> Self {
        Self {
            data,
            graph: ConflictGraph::new(data),
            resolver: ReferenceResolver::new(data.character_descriptions()),
        }
    }

    pub fn compose(&self, selection: &SelectedElements) -> String {
        self.compose_with_report(selection).text
    }

    pub fn compose_with_report(&self, selection: &SelectedElements) -> ComposedDraft {
        let mut draft = DraftWriter::default();

        // 1. Character roster
        let roster: Vec<String> = selection
            .characters
            .iter()
            .filter_map(|d| match self.data.character(d.as_str()) {
                Some(c) => Some(format!("- {}: {}", c.designation, c.description)),
                None => {
                    draft.skipped += 1;
                    None
                }
            })
            .collect();
        draft.section("Characters:", &roster);

        // 2. Subjects
        let subjects: Vec<String> = selection
            .subjects
            .iter()
            .filter_map(|&n| match self.data.subject(n) {
                Some(s) => Some(format!("- {}", s.description)),
                None => {
                    draft.skipped += 1;
                    None
                }
            })
            .collect();
        draft.section("Subjects:", &subjects);

        // 3. Predicate
        if let Some(n) = selection.predicate {
            match self.data.predicate(n) {
                Some(p) => draft.paragraph("Predicate:", &p.description),
                None => draft.skipped += 1,
            }
        }

        // 4. Conflicts, first permutation each
        let mut selected: Vec<&Conflict> = Vec::with_capacity(selection.conflicts.len());
        for id in &selection.conflicts {
            match self.graph.conflict(id.as_str()) {
                Some(conflict) => selected.push(conflict),
                None => draft.skipped += 1,
            }
        }
        let lines: Vec<String> = selected
            .iter()
            .map(|conflict| format!("- {}", self.conflict_line(conflict, None, &mut draft)))
            .collect();
        draft.section("Conflicts:", &lines);

        // 5. Outcome
        if let Some(n) = selection.outcome {
            match self.data.outcome(n) {
                Some(o) => draft.paragraph("Outcome:", &o.description),
                None => draft.skipped += 1,
            }
        }

        // 6. Linked conflicts of each selected conflict
        for conflict in &selected {
            let lines = self.linked_lines(conflict, &mut draft);
            draft.section(&format!("Conflict {} links:", conflict.id), &lines);
        }

        draft.text.push_str(END_OF_DRAFT);
        draft.text.push('\n');

        ComposedDraft {
            text: draft.text,
            unresolved: draft.unresolved,
            skipped_references: draft.skipped,
        }
    }

    /// `[id] resolved text` for the conflict's first permutation. A link
    /// transform makes `from` read as the character `to`.
    fn conflict_line(
        &self,
        conflict: &Conflict,
        via: Option<&ConflictLink>,
        draft: &mut DraftWriter,
    ) -> String {
        let Some(permutation) = conflict.first_permutation() else {
            return format!("[{}]", conflict.id);
        };

        let mut links = permutation.character_links.clone();
        if let Some(transform) = via.and_then(|l| l.transform.as_ref()) {
            let description = self
                .data
                .character(transform.to.as_str())
                .map(|c| c.description.clone())
                .unwrap_or_else(|| transform.to.0.clone());
            links.push(CharacterLink::with_description(
                transform.from.0.clone(),
                description,
            ));
        }

        let resolution = self
            .resolver
            .resolve_with_report(&permutation.description, &links);
        for designation in resolution.unresolved {
            if !draft.unresolved.contains(&designation) {
                draft.unresolved.push(designation);
            }
        }
        format!("[{}] {}", conflict.id, resolution.text)
    }

    fn linked_lines(&self, conflict: &Conflict, draft: &mut DraftWriter) -> Vec<String> {
        let mut lines = Vec::new();
        for relation in Relation::ALL {
            for group in conflict.groups(relation) {
                let mut items = Vec::new();
                for link in &group.conflict_links {
                    match self.data.conflict(link.target.as_str()) {
                        Some(target) => items.push(format!(
                            "  - {}",
                            self.conflict_line(target, Some(link), draft)
                        )),
                        None => draft.skipped += 1,
                    }
                }
                if items.is_empty() {
                    continue;
                }
                lines.push(format!("{} ({}):", heading(relation), group.mode.name()));
                lines.extend(items);
            }
        }
        lines
    }
}

fn heading(relation: Relation) -> &'static str {
    match relation {
        Relation::LeadUp => "Lead-ups",
        Relation::CarryOn => "Carry-ons",
        Relation::Include => "Includes",
    }
}

#[derive(Default)]
struct DraftWriter {
    text: String,
    unresolved: Vec<Designation>,
    skipped: usize,
}

impl DraftWriter {
    /// Write a titled block followed by a blank line; nothing if empty.
    fn section(&mut self, title: &str, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.text.push_str(title);
        self.text.push('\n');
        for line in lines {
            self.text.push_str(line);
            self.text.push('\n');
        }
        self.text.push('\n');
    }

    /// A single-description section; a blank description counts as empty.
    fn paragraph(&mut self, title: &str, description: &str) {
        if description.trim().is_empty() {
            return;
        }
        self.section(title, &[description.to_string()]);
    }
}

/// Compose the draft text for a selection.
pub fn compose_draft(selection: &SelectedElements, data: &PlottoData) -> String {
    StoryComposer::new(data).compose(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::corpus::parse_corpus;
    use crate::schema::conflict::ConflictId;

    fn data() -> PlottoData {
        parse_corpus(
            r#"Corpus(
                characters: [
                    (designation: "A", description: "a young lawyer"),
                    (designation: "A-2", description: "the lawyer's rival"),
                    (designation: "B", description: "a widow"),
                ],
                subjects: [(number: 1, description: "Person(s) in Love")],
                predicates: [(number: 4, description: "Meeting with misfortune")],
                outcomes: [(number: 2, description: "Emerges happily")],
                conflicts: [
                    (id: "1a", category: "Love", subcategory: "Rivalry",
                        permutations: [
                            (description: "A-2 challenges A"),
                            (description: "never rendered"),
                        ],
                        lead_ups: [(mode: "choose", conflict_links: [
                            (ref: "1b", transform: (from: "B", to: "A-2")),
                            (ref: "ghost"),
                        ])],
                        includes: [(mode: "include", conflict_links: [(ref: "1c")])],
                    ),
                    (id: "1b", permutations: [(description: "B mistrusts A")]),
                    (id: "1c", permutations: [(description: "A consults X", character_links: ["A", "X"])]),
                ],
            )"#,
        )
        .unwrap()
    }

    fn full_selection() -> SelectedElements {
        SelectedElements {
            characters: vec![Designation::from("A"), Designation::from("A-2")],
            subjects: vec![1],
            predicate: Some(4),
            conflicts: vec![ConflictId::from("1a")],
            outcome: Some(2),
        }
    }

    #[test]
    fn compose_full_draft_shape() {
        let data = data();
        let text = compose_draft(&full_selection(), &data);
        let expected = "\
Characters:
- A: a young lawyer
- A-2: the lawyer's rival

Subjects:
- Person(s) in Love

Predicate:
Meeting with misfortune

Conflicts:
- [1a] the lawyer's rival challenges a young lawyer

Outcome:
Emerges happily

Conflict 1a links:
Lead-ups (choose):
  - [1b] the lawyer's rival mistrusts a young lawyer
Includes (include):
  - [1c] a young lawyer consults X

END OF DRAFT
";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_selection_is_just_terminator() {
        let data = data();
        assert_eq!(
            compose_draft(&SelectedElements::new(), &data),
            format!("{END_OF_DRAFT}\n")
        );
    }

    #[test]
    fn empty_sections_omitted() {
        let data = data();
        let selection = SelectedElements {
            outcome: Some(2),
            ..Default::default()
        };
        let text = compose_draft(&selection, &data);
        assert_eq!(text, "Outcome:\nEmerges happily\n\nEND OF DRAFT\n");
    }

    #[test]
    fn report_counts_skips_and_unresolved() {
        let data = data();
        let mut selection = full_selection();
        selection.conflicts.push(ConflictId::from("nope"));
        let draft = StoryComposer::new(&data).compose_with_report(&selection);
        // "ghost" link plus the unknown selected conflict.
        assert_eq!(draft.skipped_references, 2);
        assert_eq!(draft.unresolved, vec![Designation::from("X")]);
    }

    #[test]
    fn composition_is_idempotent() {
        let data = data();
        let composer = StoryComposer::new(&data);
        let selection = full_selection();
        assert_eq!(composer.compose(&selection), composer.compose(&selection));
    }

    #[test]
    fn transform_to_unknown_character_reads_as_designation() {
        let data = parse_corpus(
            r#"Corpus(
                characters: [
                    (designation: "A", description: "a young lawyer"),
                    (designation: "B", description: "a widow"),
                ],
                conflicts: [
                    (id: "1a", permutations: [(description: "A waits")],
                        carry_ons: [(mode: "choose", conflict_links: [
                            (ref: "1b", transform: (from: "B", to: "ZZ")),
                        ])],
                    ),
                    (id: "1b", permutations: [(description: "B mistrusts A")]),
                ],
            )"#,
        )
        .unwrap();
        let selection = SelectedElements {
            conflicts: vec![ConflictId::from("1a")],
            ..Default::default()
        };
        let draft = StoryComposer::new(&data).compose_with_report(&selection);
        assert!(draft.text.contains("  - [1b] ZZ mistrusts a young lawyer"));
        assert!(draft.unresolved.is_empty());
        assert_eq!(draft.skipped_references, 0);
    }

    #[test]
    fn conflict_without_permutations_renders_id_only() {
        let data = parse_corpus(
            r#"Corpus(conflicts: [
                (id: "9z", carry_ons: [(mode: "choose", conflict_links: [(ref: "9y")])]),
                (id: "9y"),
            ])"#,
        )
        .unwrap();
        let selection = SelectedElements {
            conflicts: vec![ConflictId::from("9z")],
            ..Default::default()
        };
        assert_eq!(
            compose_draft(&selection, &data),
            "Conflicts:\n- [9z]\n\nConflict 9z links:\nCarry-ons (choose):\n  - [9y]\n\nEND OF DRAFT\n"
        );
    }

    #[test]
    fn blank_predicate_and_outcome_are_omitted() {
        let data = parse_corpus(
            r#"Corpus(
                predicates: [(number: 1, description: "")],
                outcomes: [(number: 1, description: "  ")],
            )"#,
        )
        .unwrap();
        let selection = SelectedElements {
            predicate: Some(1),
            outcome: Some(1),
            ..Default::default()
        };
        let draft = StoryComposer::new(&data).compose_with_report(&selection);
        assert_eq!(draft.text, format!("{END_OF_DRAFT}\n"));
        assert_eq!(draft.skipped_references, 0);
    }

    #[test]
    fn transform_does_not_leak_into_shared_table() {
        let data = data();
        let selection = SelectedElements {
            conflicts: vec![ConflictId::from("1b")],
            ..Default::default()
        };
        let text = compose_draft(&selection, &data);
        assert!(text.contains("- [1b] a widow mistrusts a young lawyer"));
    }
}
