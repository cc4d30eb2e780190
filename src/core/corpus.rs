//! Corpus loading: RON text to a typed `PlottoData`.
//!
//! Structural errors abort the whole parse. Problems inside an otherwise
//! well-formed record are reported as warnings and replaced with defaults.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::core::resolver::{DesignatorIndex, Segment};
use crate::schema::character::{Character, CharacterLink, Designation, Sex};
use crate::schema::conflict::{
    Conflict, ConflictId, ConflictLink, Group, GroupMode, Permutation, Transform,
};
use crate::schema::plotto::PlottoData;
use crate::schema::record::{Outcome, Predicate, Subject};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("corpus syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ron::error::SpannedError> for ParseError {
    fn from(err: ron::error::SpannedError) -> Self {
        ParseError::Syntax {
            line: err.position.line,
            column: err.position.col,
            message: err.code.to_string(),
        }
    }
}

/// The record kind a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Character,
    Subject,
    Predicate,
    Outcome,
    Conflict,
    Permutation,
    ConflictLink,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Character => "character",
            Self::Subject => "subject",
            Self::Predicate => "predicate",
            Self::Outcome => "outcome",
            Self::Conflict => "conflict",
            Self::Permutation => "permutation",
            Self::ConflictLink => "conflict link",
        })
    }
}

/// A non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseWarning {
    #[error("{kind} {context}: malformed number {value:?}, using 0")]
    MalformedNumber {
        kind: RecordKind,
        context: String,
        value: String,
    },
    #[error("{kind} {context}: missing number, using 0")]
    MissingNumber { kind: RecordKind, context: String },
    #[error("{kind} {context}: missing identifier, record skipped")]
    MissingId { kind: RecordKind, context: String },
    #[error("duplicate {kind} {key}, keeping the first")]
    Duplicate { kind: RecordKind, key: String },
    #[error("character {designation}: unknown sex {value:?}, using none")]
    UnknownSex { designation: String, value: String },
    #[error("{context}: unknown group mode {value:?}, using choose")]
    UnknownGroupMode { context: String, value: String },
    #[error("{context}: malformed permutations hint {value:?}, ignored")]
    MalformedHint { context: String, value: String },
    #[error("conflict {id} has no permutations")]
    NoPermutations { id: String },
}

/// Parse result: the data plus any warnings raised along the way.
#[derive(Debug, Clone)]
pub struct ParsedCorpus {
    pub data: PlottoData,
    pub warnings: Vec<ParseWarning>,
}

// RON deserialization helpers. Every field is optional in the file, so the
// raw structs default everything and conversion fills in the gaps.

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
    /// Any other value (a bool, `None`, a list) so it can be reported
    /// instead of failing the whole parse.
    Other(ron::Value),
}

impl RawNumber {
    /// The value as a `u32`, or its text for a warning.
    fn to_u32(&self) -> Result<u32, String> {
        match self {
            RawNumber::Int(n) => u32::try_from(*n).map_err(|_| n.to_string()),
            RawNumber::Text(text) => text.trim().parse::<u32>().map_err(|_| text.clone()),
            RawNumber::Float(f) => Err(f.to_string()),
            RawNumber::Other(value) => {
                Err(ron::to_string(value).unwrap_or_else(|_| format!("{value:?}")))
            }
        }
    }
}

/// Treat a present field as `Some` without requiring RON's `Some(..)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename = "Corpus", default)]
struct RonCorpus {
    characters: Vec<RonCharacter>,
    subjects: Vec<RonRecord>,
    predicates: Vec<RonPredicate>,
    outcomes: Vec<RonRecord>,
    conflicts: Vec<RonConflict>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonCharacter {
    designation: String,
    sex: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonRecord {
    #[serde(deserialize_with = "present")]
    number: Option<RawNumber>,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonPredicate {
    #[serde(deserialize_with = "present")]
    number: Option<RawNumber>,
    description: String,
    conflict_links: Vec<RonConflictLink>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonTransform {
    from: String,
    to: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonConflictLink {
    #[serde(rename = "ref")]
    target: String,
    category: String,
    subcategory: String,
    #[serde(deserialize_with = "present")]
    permutations: Option<RawNumber>,
    #[serde(deserialize_with = "present")]
    transform: Option<RonTransform>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonPermutation {
    #[serde(deserialize_with = "present")]
    number: Option<RawNumber>,
    description: String,
    #[serde(deserialize_with = "present")]
    character_links: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonGroup {
    mode: String,
    conflict_links: Vec<RonConflictLink>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RonConflict {
    id: String,
    category: String,
    subcategory: String,
    permutations: Vec<RonPermutation>,
    lead_ups: Vec<RonGroup>,
    carry_ons: Vec<RonGroup>,
    includes: Vec<RonGroup>,
}

/// Builds `PlottoData` from corpus text.
pub struct CorpusParser {
    warnings: Vec<ParseWarning>,
}

impl CorpusParser {
    /// Load and parse a corpus file.
    pub fn load(path: &Path) -> Result<ParsedCorpus, ParseError> {
        let contents = std::fs::read_to_string(path)?;
        let parsed = Self::parse(&contents)?;
        tracing::info!(
            path = %path.display(),
            characters = parsed.data.characters().len(),
            subjects = parsed.data.subjects().len(),
            predicates = parsed.data.predicates().len(),
            outcomes = parsed.data.outcomes().len(),
            conflicts = parsed.data.conflicts().len(),
            warnings = parsed.warnings.len(),
            "loaded plot corpus"
        );
        Ok(parsed)
    }

    /// Parse corpus text. Missing sections yield empty collections.
    pub fn parse(input: &str) -> Result<ParsedCorpus, ParseError> {
        let raw: RonCorpus = ron::from_str(input)?;
        let mut parser = CorpusParser {
            warnings: Vec::new(),
        };
        let data = parser.convert(raw);
        Ok(ParsedCorpus {
            data,
            warnings: parser.warnings,
        })
    }

    fn warn(&mut self, warning: ParseWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn convert(&mut self, raw: RonCorpus) -> PlottoData {
        let mut data = PlottoData::new();

        for (i, ch) in raw.characters.into_iter().enumerate() {
            let designation = ch.designation.trim().to_string();
            if designation.is_empty() {
                self.warn(ParseWarning::MissingId {
                    kind: RecordKind::Character,
                    context: format!("#{}", i + 1),
                });
                continue;
            }
            let sex = match Sex::parse(&ch.sex) {
                Some(sex) => sex,
                None => {
                    self.warn(ParseWarning::UnknownSex {
                        designation: designation.clone(),
                        value: ch.sex.clone(),
                    });
                    Sex::None
                }
            };
            let character = Character {
                designation: Designation::new(designation.clone()),
                sex,
                description: ch.description,
            };
            if !data.insert_character(character) {
                self.warn(ParseWarning::Duplicate {
                    kind: RecordKind::Character,
                    key: designation,
                });
            }
        }

        for (i, rec) in raw.subjects.into_iter().enumerate() {
            let number = self.number(rec.number, RecordKind::Subject, &format!("#{}", i + 1));
            if !data.insert_subject(Subject {
                number,
                description: rec.description,
            }) {
                self.warn(ParseWarning::Duplicate {
                    kind: RecordKind::Subject,
                    key: number.to_string(),
                });
            }
        }

        for (i, rec) in raw.predicates.into_iter().enumerate() {
            let context = format!("#{}", i + 1);
            let number = self.number(rec.number, RecordKind::Predicate, &context);
            let conflict_links = self.links(rec.conflict_links, &format!("predicate {context}"));
            if !data.insert_predicate(Predicate {
                number,
                description: rec.description,
                conflict_links,
            }) {
                self.warn(ParseWarning::Duplicate {
                    kind: RecordKind::Predicate,
                    key: number.to_string(),
                });
            }
        }

        for (i, rec) in raw.outcomes.into_iter().enumerate() {
            let number = self.number(rec.number, RecordKind::Outcome, &format!("#{}", i + 1));
            if !data.insert_outcome(Outcome {
                number,
                description: rec.description,
            }) {
                self.warn(ParseWarning::Duplicate {
                    kind: RecordKind::Outcome,
                    key: number.to_string(),
                });
            }
        }

        // Links missing from a permutation are derived from its prose, so
        // the designation index has to exist before conflicts are converted.
        let designations: Vec<String> = data
            .characters()
            .iter()
            .map(|c| c.designation.0.clone())
            .collect();
        let index = DesignatorIndex::new(designations.iter().map(String::as_str));

        for (i, rc) in raw.conflicts.into_iter().enumerate() {
            let id = rc.id.trim().to_string();
            if id.is_empty() {
                self.warn(ParseWarning::MissingId {
                    kind: RecordKind::Conflict,
                    context: format!("#{}", i + 1),
                });
                continue;
            }
            if data.conflict(&id).is_some() {
                self.warn(ParseWarning::Duplicate {
                    kind: RecordKind::Conflict,
                    key: id,
                });
                continue;
            }
            if rc.permutations.is_empty() {
                self.warn(ParseWarning::NoPermutations { id: id.clone() });
            }

            let permutations = rc
                .permutations
                .into_iter()
                .enumerate()
                .map(|(p, perm)| self.permutation(perm, p, &id, &index))
                .collect();
            let lead_ups = self.groups(rc.lead_ups, &id, "lead-ups");
            let carry_ons = self.groups(rc.carry_ons, &id, "carry-ons");
            let includes = self.groups(rc.includes, &id, "includes");

            data.insert_conflict(Conflict {
                id: ConflictId::new(id),
                category: rc.category,
                subcategory: rc.subcategory,
                permutations,
                lead_ups,
                carry_ons,
                includes,
            });
        }

        data
    }

    fn number(&mut self, raw: Option<RawNumber>, kind: RecordKind, context: &str) -> u32 {
        match raw.as_ref().map(RawNumber::to_u32) {
            Some(Ok(n)) => n,
            Some(Err(value)) => {
                self.warn(ParseWarning::MalformedNumber {
                    kind,
                    context: context.to_string(),
                    value,
                });
                0
            }
            None => {
                self.warn(ParseWarning::MissingNumber {
                    kind,
                    context: context.to_string(),
                });
                0
            }
        }
    }

    fn permutation(
        &mut self,
        raw: RonPermutation,
        position: usize,
        conflict_id: &str,
        index: &DesignatorIndex<'_>,
    ) -> Permutation {
        let context = format!("{conflict_id}/#{}", position + 1);
        // Permutation numbers are ordinal; an absent one means "its position".
        let number = match raw.number {
            Some(n) => self.number(Some(n), RecordKind::Permutation, &context),
            None => (position + 1) as u32,
        };

        let character_links = match raw.character_links {
            Some(refs) => refs
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .map(CharacterLink::new)
                .collect(),
            None => derive_character_links(&raw.description, index),
        };

        Permutation {
            number,
            description: raw.description,
            character_links,
        }
    }

    fn groups(&mut self, raw: Vec<RonGroup>, conflict_id: &str, field: &str) -> Vec<Group> {
        raw.into_iter()
            .enumerate()
            .map(|(g, group)| {
                let context = format!("conflict {conflict_id} {field} #{}", g + 1);
                let mode = if group.mode.trim().is_empty() {
                    GroupMode::Choose
                } else {
                    match GroupMode::parse(&group.mode) {
                        Some(mode) => mode,
                        None => {
                            self.warn(ParseWarning::UnknownGroupMode {
                                context: context.clone(),
                                value: group.mode.clone(),
                            });
                            GroupMode::Choose
                        }
                    }
                };
                Group {
                    mode,
                    conflict_links: self.links(group.conflict_links, &context),
                }
            })
            .collect()
    }

    fn links(&mut self, raw: Vec<RonConflictLink>, context: &str) -> Vec<ConflictLink> {
        let mut links = Vec::with_capacity(raw.len());
        for (l, link) in raw.into_iter().enumerate() {
            let target = link.target.trim().to_string();
            if target.is_empty() {
                self.warn(ParseWarning::MissingId {
                    kind: RecordKind::ConflictLink,
                    context: format!("{context} link #{}", l + 1),
                });
                continue;
            }
            let transform = link
                .transform
                .filter(|t| !t.from.trim().is_empty() && !t.to.trim().is_empty())
                .map(|t| Transform {
                    from: Designation::new(t.from.trim()),
                    to: Designation::new(t.to.trim()),
                });
            let permutations = match link.permutations.as_ref().map(RawNumber::to_u32) {
                Some(Ok(n)) => Some(n),
                Some(Err(value)) => {
                    self.warn(ParseWarning::MalformedHint {
                        context: format!("{context} link {target}"),
                        value,
                    });
                    None
                }
                None => None,
            };
            links.push(ConflictLink {
                target: ConflictId::new(target),
                category: link.category,
                subcategory: link.subcategory,
                permutations,
                transform,
            });
        }
        links
    }
}

/// Known designations in `text`, in first-seen order.
fn derive_character_links(text: &str, index: &DesignatorIndex<'_>) -> Vec<CharacterLink> {
    let mut links: Vec<CharacterLink> = Vec::new();
    for segment in index.tokenize(text) {
        if let Segment::Designator(d) = segment {
            if !links.iter().any(|l| l.designation.as_str() == d) {
                links.push(CharacterLink::new(d));
            }
        }
    }
    links
}

/// Parse corpus text, discarding warnings (they are still logged).
pub fn parse_corpus(text: &str) -> Result<PlottoData, ParseError> {
    CorpusParser::parse(text).map(|parsed| parsed.data)
}
