//! Related-conflict recommendation and causal placement of accepted picks.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::graph::ConflictGraph;
use crate::schema::conflict::{Conflict, ConflictId, Relation};
use crate::schema::selection::SelectedElements;

/// Recommendations are sampled down to at most this many.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Why a conflict was recommended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// Linked from the selected predicate.
    Predicate(u32),
    /// The predicate has no links, so the whole corpus is offered.
    Corpus,
    /// Leads up to the given selected conflict.
    LeadUp(ConflictId),
    /// Carries on from the given selected conflict.
    CarryOn(ConflictId),
}

/// Display-ready view of a recommended conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub id: ConflictId,
    pub category: String,
    pub subcategory: String,
    pub source: Source,
}

impl ConflictSummary {
    fn new(conflict: &Conflict, source: Source) -> Self {
        Self {
            id: conflict.id.clone(),
            category: conflict.category.clone(),
            subcategory: conflict.subcategory.clone(),
            source,
        }
    }
}

/// Where an accepted conflict ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Appended(usize),
    /// Inserted in front of the conflict it leads up to.
    Inserted(usize),
    AlreadySelected,
    Unknown,
}

pub struct RelatedConflictResolver<'a> {
    graph: ConflictGraph<'a>,
}

impl<'a> RelatedConflictResolver<'a> {
    pub fn new(graph: ConflictGraph<'a>) -> Self {
        Self { graph }
    }

    /// The full, uncapped candidate set in deterministic order.
    pub fn candidates(&self, selection: &SelectedElements) -> Vec<ConflictSummary> {
        let mut out: Vec<ConflictSummary> = Vec::new();
        let mut push = |conflict: &Conflict, source: Source| {
            if selection.has_conflict(conflict.id.as_str())
                || out.iter().any(|c| c.id == conflict.id)
            {
                return;
            }
            out.push(ConflictSummary::new(conflict, source));
        };

        if selection.conflicts.is_empty() {
            let Some(number) = selection.predicate else {
                return out;
            };
            let Some(predicate) = self.graph.data().predicate(number) else {
                return out;
            };
            if predicate.conflict_links.is_empty() {
                for conflict in self.graph.data().conflicts() {
                    push(conflict, Source::Corpus);
                }
            } else {
                for conflict in self.graph.predicate_targets(number) {
                    push(conflict, Source::Predicate(number));
                }
            }
            return out;
        }

        for selected in &selection.conflicts {
            for edge in self.graph.lead_ups(selected.as_str()).edges {
                push(edge.target, Source::LeadUp(selected.clone()));
            }
            for edge in self.graph.carry_ons(selected.as_str()).edges {
                push(edge.target, Source::CarryOn(selected.clone()));
            }
        }
        out
    }

    /// Candidates sampled uniformly without replacement down to
    /// `MAX_RECOMMENDATIONS`, kept in candidate order.
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        selection: &SelectedElements,
        rng: &mut R,
    ) -> Vec<ConflictSummary> {
        let candidates = self.candidates(selection);
        if candidates.len() <= MAX_RECOMMENDATIONS {
            return candidates;
        }
        let mut picked = index::sample(rng, candidates.len(), MAX_RECOMMENDATIONS).into_vec();
        picked.sort_unstable();
        let mut candidates: Vec<Option<ConflictSummary>> = candidates.into_iter().map(Some).collect();
        picked
            .into_iter()
            .filter_map(|i| candidates[i].take())
            .collect()
    }

    /// Add `id` to the selection. A lead-up of the most recently placed
    /// conflict goes in front of it; anything else is appended.
    pub fn accept(&self, selection: &mut SelectedElements, id: &str) -> Placement {
        let Some(conflict) = self.graph.conflict(id) else {
            return Placement::Unknown;
        };
        if selection.has_conflict(id) {
            return Placement::AlreadySelected;
        }

        let leads_up_to_last = selection.last_conflict().is_some_and(|last| {
            self.graph
                .adjacency(last.as_str(), Relation::LeadUp)
                .edges
                .iter()
                .any(|e| e.target.id.as_str() == id)
        });

        if leads_up_to_last {
            let at = selection.conflicts.len() - 1;
            selection.conflicts.insert(at, conflict.id.clone());
            Placement::Inserted(at)
        } else {
            selection.conflicts.push(conflict.id.clone());
            Placement::Appended(selection.conflicts.len() - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::corpus::parse_corpus;
    use crate::schema::plotto::PlottoData;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn data() -> PlottoData {
        parse_corpus(
            r#"Corpus(
                predicates: [
                    (number: 1, conflict_links: [(ref: "1a"), (ref: "2")]),
                    (number: 2),
                ],
                conflicts: [
                    (id: "1a", permutations: [(description: "x")],
                        lead_ups: [(mode: "choose", conflict_links: [(ref: "1b"), (ref: "gone")])]),
                    (id: "1b", permutations: [(description: "x")]),
                    (id: "2", permutations: [(description: "x")],
                        lead_ups: [(mode: "choose", conflict_links: [(ref: "3"), (ref: "4")])],
                        carry_ons: [(mode: "include", conflict_links: [(ref: "5"), (ref: "6"), (ref: "3")])]),
                    (id: "3", permutations: [(description: "x")]),
                    (id: "4", permutations: [(description: "x")]),
                    (id: "5", permutations: [(description: "x")]),
                    (id: "6", permutations: [(description: "x")]),
                ],
            )"#,
        )
        .unwrap()
    }

    fn ids(summaries: &[ConflictSummary]) -> Vec<&str> {
        summaries.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn nothing_selected_recommends_nothing() {
        let data = data();
        let resolver = RelatedConflictResolver::new(ConflictGraph::new(&data));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(resolver
            .recommend(&SelectedElements::new(), &mut rng)
            .is_empty());
    }

    #[test]
    fn predicate_links_recommended() {
        let data = data();
        let resolver = RelatedConflictResolver::new(ConflictGraph::new(&data));
        let selection = SelectedElements {
            predicate: Some(1),
            ..Default::default()
        };
        let got = resolver.candidates(&selection);
        assert_eq!(ids(&got), vec!["1a", "2"]);
        assert_eq!(got[0].source, Source::Predicate(1));
    }

    #[test]
    fn predicate_without_links_offers_corpus() {
        let data = data();
        let resolver = RelatedConflictResolver::new(ConflictGraph::new(&data));
        let selection = SelectedElements {
            predicate: Some(2),
            ..Default::default()
        };
        let got = resolver.candidates(&selection);
        assert_eq!(got.len(), data.conflicts().len());
        assert!(got.iter().all(|c| c.source == Source::Corpus));
    }

    #[test]
    fn union_of_lead_ups_and_carry_ons_deduplicated() {
        let data = data();
        let resolver = RelatedConflictResolver::new(ConflictGraph::new(&data));
        let selection = SelectedElements {
            conflicts: vec![ConflictId::from("2"), ConflictId::from("4")],
            ..Default::default()
        };
        // "4" is selected so it is excluded; "3" appears once.
        assert_eq!(ids(&resolver.candidates(&selection)), vec!["3", "5", "6"]);
    }

    #[test]
    fn recommendations_capped_at_three() {
        let data = data();
        let resolver = RelatedConflictResolver::new(ConflictGraph::new(&data));
        let selection = SelectedElements {
            predicate: Some(2),
            ..Default::default()
        };
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let got = resolver.recommend(&selection, &mut rng);
            assert_eq!(got.len(), MAX_RECOMMENDATIONS);
            let mut unique = ids(&got);
            unique.dedup();
            assert_eq!(unique.len(), MAX_RECOMMENDATIONS);
        }
    }

    #[test]
    fn sampling_is_seeded() {
        let data = data();
        let resolver = RelatedConflictResolver::new(ConflictGraph::new(&data));
        let selection = SelectedElements {
            predicate: Some(2),
            ..Default::default()
        };
        let a = resolver.recommend(&selection, &mut StdRng::seed_from_u64(9));
        let b = resolver.recommend(&selection, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn accepting_lead_up_inserts_before_last() {
        let data = data();
        let resolver = RelatedConflictResolver::new(ConflictGraph::new(&data));
        let mut selection = SelectedElements::new();
        assert_eq!(resolver.accept(&mut selection, "1a"), Placement::Appended(0));

        let recs = resolver.recommend(&selection, &mut StdRng::seed_from_u64(0));
        assert_eq!(ids(&recs), vec!["1b"]);
        assert_eq!(recs[0].source, Source::LeadUp(ConflictId::from("1a")));

        assert_eq!(resolver.accept(&mut selection, "1b"), Placement::Inserted(0));
        let order: Vec<&str> = selection.conflicts.iter().map(|c| c.as_str()).collect();
        assert_eq!(order, vec!["1b", "1a"]);
    }

    #[test]
    fn accepting_carry_on_appends() {
        let data = data();
        let resolver = RelatedConflictResolver::new(ConflictGraph::new(&data));
        let mut selection = SelectedElements::new();
        resolver.accept(&mut selection, "2");
        assert_eq!(resolver.accept(&mut selection, "5"), Placement::Appended(1));
        // "3" leads up to "2", but "5" is now last.
        assert_eq!(resolver.accept(&mut selection, "3"), Placement::Appended(2));
        assert_eq!(resolver.accept(&mut selection, "3"), Placement::AlreadySelected);
        assert_eq!(resolver.accept(&mut selection, "zzz"), Placement::Unknown);
        assert_eq!(selection.conflicts.len(), 3);
    }
}
