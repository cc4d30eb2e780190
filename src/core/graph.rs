//! Read-only adjacency over the conflict corpus.

use crate::schema::conflict::{Conflict, ConflictId, ConflictLink, GroupMode, Relation};
use crate::schema::plotto::PlottoData;

/// One resolved edge out of a conflict.
#[derive(Debug, Clone, Copy)]
pub struct Edge<'a> {
    pub mode: GroupMode,
    pub target: &'a Conflict,
    /// The link the edge came from, carrying any transform.
    pub link: &'a ConflictLink,
}

/// Edges of one relation kind, plus the count of targets that were not in
/// the corpus and got skipped.
#[derive(Debug, Clone, Default)]
pub struct Adjacency<'a> {
    pub edges: Vec<Edge<'a>>,
    pub skipped: usize,
}

/// A link whose target id does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingRef {
    Conflict {
        source: ConflictId,
        relation: Relation,
        target: ConflictId,
    },
    Predicate {
        number: u32,
        target: ConflictId,
    },
    Character {
        conflict: ConflictId,
        permutation: u32,
        designation: String,
    },
}

/// Every dangling reference in a corpus.
#[derive(Debug, Clone, Default)]
pub struct CorpusDiagnostics {
    pub dangling: Vec<DanglingRef>,
}

impl CorpusDiagnostics {
    pub fn skipped_references(&self) -> usize {
        self.dangling.len()
    }

    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty()
    }
}

/// View over `PlottoData.conflicts`.
#[derive(Debug, Clone, Copy)]
pub struct ConflictGraph<'a> {
    data: &'a PlottoData,
}

impl<'a> ConflictGraph<'a> {
    pub fn new(data: &'a PlottoData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &'a PlottoData {
        self.data
    }

    pub fn conflict(&self, id: &str) -> Option<&'a Conflict> {
        self.data.conflict(id)
    }

    /// Edges of `relation` out of conflict `id`, in group then link order.
    /// An unknown `id` has no edges.
    pub fn adjacency(&self, id: &str, relation: Relation) -> Adjacency<'a> {
        let mut adjacency = Adjacency::default();
        let Some(source) = self.data.conflict(id) else {
            return adjacency;
        };
        for group in source.groups(relation) {
            for link in &group.conflict_links {
                match self.data.conflict(link.target.as_str()) {
                    Some(target) => adjacency.edges.push(Edge {
                        mode: group.mode,
                        target,
                        link,
                    }),
                    None => {
                        tracing::debug!(
                            source = %source.id,
                            relation = relation.name(),
                            target = %link.target,
                            "skipping dangling conflict link"
                        );
                        adjacency.skipped += 1;
                    }
                }
            }
        }
        adjacency
    }

    pub fn lead_ups(&self, id: &str) -> Adjacency<'a> {
        self.adjacency(id, Relation::LeadUp)
    }

    pub fn carry_ons(&self, id: &str) -> Adjacency<'a> {
        self.adjacency(id, Relation::CarryOn)
    }

    pub fn includes(&self, id: &str) -> Adjacency<'a> {
        self.adjacency(id, Relation::Include)
    }

    /// Conflicts a predicate points at, skipping unknown targets.
    pub fn predicate_targets(&self, number: u32) -> Vec<&'a Conflict> {
        self.data
            .predicate(number)
            .map(|p| {
                p.conflict_links
                    .iter()
                    .filter_map(|l| self.data.conflict(l.target.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Scan the whole corpus for references that would be skipped at use.
    pub fn diagnostics(&self) -> CorpusDiagnostics {
        let mut dangling = Vec::new();

        for predicate in self.data.predicates() {
            for link in &predicate.conflict_links {
                if self.data.conflict(link.target.as_str()).is_none() {
                    dangling.push(DanglingRef::Predicate {
                        number: predicate.number,
                        target: link.target.clone(),
                    });
                }
            }
        }

        for conflict in self.data.conflicts() {
            for relation in Relation::ALL {
                for group in conflict.groups(relation) {
                    for link in &group.conflict_links {
                        if self.data.conflict(link.target.as_str()).is_none() {
                            dangling.push(DanglingRef::Conflict {
                                source: conflict.id.clone(),
                                relation,
                                target: link.target.clone(),
                            });
                        }
                    }
                }
            }
            for permutation in &conflict.permutations {
                for link in &permutation.character_links {
                    if self.data.character(link.designation.as_str()).is_none() {
                        dangling.push(DanglingRef::Character {
                            conflict: conflict.id.clone(),
                            permutation: permutation.number,
                            designation: link.designation.0.clone(),
                        });
                    }
                }
            }
        }

        CorpusDiagnostics { dangling }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::corpus::parse_corpus;

    fn data() -> PlottoData {
        parse_corpus(
            r#"Corpus(
                characters: [(designation: "A"), (designation: "B")],
                predicates: [(number: 1, conflict_links: [(ref: "1"), (ref: "404")])],
                conflicts: [
                    (id: "1", permutations: [(description: "A meets B")],
                        lead_ups: [
                            (mode: "choose", conflict_links: [(ref: "2"), (ref: "missing")]),
                            (mode: "include", conflict_links: [(ref: "3")]),
                        ],
                        carry_ons: [(mode: "choose", conflict_links: [(ref: "3")])],
                    ),
                    (id: "2", permutations: [(description: "A and X", character_links: ["A", "X"])]),
                    (id: "3", permutations: [(description: "B")]),
                ],
            )"#,
        )
        .unwrap()
    }

    #[test]
    fn adjacency_in_group_order_with_modes() {
        let data = data();
        let graph = ConflictGraph::new(&data);
        let lead_ups = graph.lead_ups("1");
        let ids: Vec<(&str, GroupMode)> = lead_ups
            .edges
            .iter()
            .map(|e| (e.target.id.as_str(), e.mode))
            .collect();
        assert_eq!(ids, vec![("2", GroupMode::Choose), ("3", GroupMode::Include)]);
        assert_eq!(lead_ups.skipped, 1);
    }

    #[test]
    fn unknown_source_has_no_edges() {
        let data = data();
        let graph = ConflictGraph::new(&data);
        let adj = graph.carry_ons("nope");
        assert!(adj.edges.is_empty());
        assert_eq!(adj.skipped, 0);
        assert!(graph.includes("1").edges.is_empty());
    }

    #[test]
    fn predicate_targets_skip_dangling() {
        let data = data();
        let graph = ConflictGraph::new(&data);
        let ids: Vec<&str> = graph
            .predicate_targets(1)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1"]);
        assert!(graph.predicate_targets(7).is_empty());
    }

    #[test]
    fn diagnostics_count_every_dangling_ref() {
        let data = data();
        let diagnostics = ConflictGraph::new(&data).diagnostics();
        assert_eq!(diagnostics.skipped_references(), 3);
        assert!(!diagnostics.is_clean());
        assert!(diagnostics.dangling.contains(&DanglingRef::Predicate {
            number: 1,
            target: ConflictId::from("404"),
        }));
        assert!(diagnostics.dangling.contains(&DanglingRef::Conflict {
            source: ConflictId::from("1"),
            relation: Relation::LeadUp,
            target: ConflictId::from("missing"),
        }));
        assert!(diagnostics.dangling.contains(&DanglingRef::Character {
            conflict: ConflictId::from("2"),
            permutation: 1,
            designation: "X".to_string(),
        }));
    }
}
