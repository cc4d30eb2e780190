use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Short symbolic character identifier such as `A`, `A-2` or `FB`.
///
/// Designations are compared by exact token match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Designation(pub String);

impl Designation {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Designation {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Designation {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Sex of a character as recorded in the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    /// Either sex may play the role.
    Any,
    /// Not a person (an object, a group, a place).
    None,
}

impl Default for Sex {
    fn default() -> Self {
        Self::None
    }
}

impl Sex {
    /// Map a corpus spelling to a sex. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Sex> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Self::Male),
            "female" | "f" => Some(Self::Female),
            "any" => Some(Self::Any),
            "none" | "" => Some(Self::None),
            _ => Option::None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Any => "any",
            Self::None => "none",
        }
    }
}

/// A character archetype. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub designation: Designation,
    pub sex: Sex,
    pub description: String,
}

/// A designator reference used inside permutation prose.
///
/// `description` overrides the character table entry for this call site;
/// composition sets it when a link transform remaps one role onto another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterLink {
    pub designation: Designation,
    pub description: Option<String>,
}

impl CharacterLink {
    pub fn new(designation: impl Into<String>) -> Self {
        Self {
            designation: Designation::new(designation),
            description: None,
        }
    }

    pub fn with_description(designation: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            designation: Designation::new(designation),
            description: Some(description.into()),
        }
    }
}
