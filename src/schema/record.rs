use serde::{Deserialize, Serialize};

use super::conflict::ConflictLink;

/// A protagonist archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub number: u32,
    pub description: String,
}

/// A plot-development motif, pointing at the conflicts that realise it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub number: u32,
    pub description: String,
    pub conflict_links: Vec<ConflictLink>,
}

/// How a plot resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub number: u32,
    pub description: String,
}
