//! Plot Engine: a plot construction engine for Plotto-style combinatorial
//! plot grammars.
//!
//! Parses a corpus of characters, subjects, predicates, outcomes and
//! conflicts, recommends causally related conflicts as a selection grows,
//! resolves character designators in conflict prose, and composes a
//! deterministic textual draft from a selection.

pub mod core;
pub mod schema;

pub use crate::core::composer::compose_draft;
pub use crate::core::corpus::parse_corpus;
pub use crate::core::engine::{EngineError, PlotEngine};
pub use crate::core::selector::select_element;
pub use crate::schema::plotto::PlottoData;
pub use crate::schema::selection::{Category, SelectedElements};

use rand::Rng;

use crate::core::graph::ConflictGraph;
use crate::core::recommend::{ConflictSummary, RelatedConflictResolver};

/// Recommended conflicts for a selection, sampled with `rng`.
pub fn recommend_conflicts<R: Rng + ?Sized>(
    selection: &SelectedElements,
    data: &PlottoData,
    rng: &mut R,
) -> Vec<ConflictSummary> {
    RelatedConflictResolver::new(ConflictGraph::new(data)).recommend(selection, rng)
}
