use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use super::character::{CharacterLink, Designation};

/// Newtype wrapper for conflict ids such as `"1a"` or `"1463b"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConflictId(pub String);

impl ConflictId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ConflictId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConflictId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A `from` -> `to` designator remapping applied when traversing a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    pub from: Designation,
    pub to: Designation,
}

/// A directed reference to another conflict.
///
/// `category` and `subcategory` are copies of the target's classification,
/// kept so a link can be displayed without a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictLink {
    pub target: ConflictId,
    pub category: String,
    pub subcategory: String,
    /// Hint for how many permutations of the target apply.
    pub permutations: Option<u32>,
    pub transform: Option<Transform>,
}

impl ConflictLink {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: ConflictId::new(target),
            category: String::new(),
            subcategory: String::new(),
            permutations: None,
            transform: None,
        }
    }
}

/// One concrete phrasing of a conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permutation {
    pub number: u32,
    pub description: String,
    pub character_links: Vec<CharacterLink>,
}

/// Whether a group offers alternatives or a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupMode {
    /// Pick one of the linked conflicts.
    Choose,
    /// All linked conflicts apply.
    Include,
}

impl Default for GroupMode {
    fn default() -> Self {
        Self::Choose
    }
}

impl GroupMode {
    pub fn parse(value: &str) -> Option<GroupMode> {
        match value.trim().to_ascii_lowercase().as_str() {
            "choose" => Some(Self::Choose),
            "include" => Some(Self::Include),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Choose => "choose",
            Self::Include => "include",
        }
    }
}

/// A moded bundle of outgoing links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub mode: GroupMode,
    pub conflict_links: Vec<ConflictLink>,
}

/// The three kinds of directed edge out of a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    LeadUp,
    CarryOn,
    Include,
}

impl Relation {
    pub const ALL: [Relation; 3] = [Relation::LeadUp, Relation::CarryOn, Relation::Include];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LeadUp => "lead-up",
            Self::CarryOn => "carry-on",
            Self::Include => "include",
        }
    }
}

/// A unit of dramatic situation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: ConflictId,
    pub category: String,
    pub subcategory: String,
    pub permutations: Vec<Permutation>,
    pub lead_ups: Vec<Group>,
    pub carry_ons: Vec<Group>,
    pub includes: Vec<Group>,
}

impl Conflict {
    /// The outgoing groups for one relation kind.
    pub fn groups(&self, relation: Relation) -> &[Group] {
        match relation {
            Relation::LeadUp => &self.lead_ups,
            Relation::CarryOn => &self.carry_ons,
            Relation::Include => &self.includes,
        }
    }

    /// The phrasing used for drafts.
    pub fn first_permutation(&self) -> Option<&Permutation> {
        self.permutations.first()
    }
}
