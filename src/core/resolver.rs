//! Designator resolution: substitutes character designations embedded in
//! permutation prose with character descriptions.

use rustc_hash::FxHashMap;
use std::borrow::Cow;

use crate::schema::character::{CharacterLink, Designation};

/// A segment of tokenized prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    /// Text emitted as-is.
    Literal(&'t str),
    /// A whole-token occurrence of a known designation.
    Designator(&'t str),
}

/// Characters that continue a token. A designation only matches when it is
/// not embedded in a longer run of these.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Known designations bucketed by first character, each bucket ordered by
/// descending length so `A-2` is always tried before `A`.
#[derive(Debug, Clone, Default)]
pub struct DesignatorIndex<'a> {
    by_first: FxHashMap<char, Vec<&'a str>>,
}

impl<'a> DesignatorIndex<'a> {
    pub fn new<I>(designations: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut by_first: FxHashMap<char, Vec<&'a str>> = FxHashMap::default();
        for designation in designations {
            let Some(first) = designation.chars().next() else {
                continue;
            };
            let bucket = by_first.entry(first).or_default();
            if !bucket.contains(&designation) {
                bucket.push(designation);
            }
        }
        for bucket in by_first.values_mut() {
            // Longest first; ties broken lexically so the order is stable.
            bucket.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        }
        Self { by_first }
    }

    pub fn is_empty(&self) -> bool {
        self.by_first.is_empty()
    }

    /// Split `text` into literal runs and designator tokens in one
    /// left-to-right pass.
    pub fn tokenize<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut prev: Option<char> = None;
        let mut i = 0;

        while i < text.len() {
            let rest = &text[i..];
            let Some(c) = rest.chars().next() else {
                break;
            };

            let at_boundary = prev.map_or(true, |p| !is_word_char(p));
            let matched = if at_boundary {
                self.match_at(rest)
            } else {
                None
            };

            match matched {
                Some(len) => {
                    if literal_start < i {
                        segments.push(Segment::Literal(&text[literal_start..i]));
                    }
                    segments.push(Segment::Designator(&text[i..i + len]));
                    prev = text[..i + len].chars().next_back();
                    i += len;
                    literal_start = i;
                }
                None => {
                    prev = Some(c);
                    i += c.len_utf8();
                }
            }
        }

        if literal_start < text.len() {
            segments.push(Segment::Literal(&text[literal_start..]));
        }
        segments
    }

    /// Length in bytes of the longest designation that matches as a whole
    /// token at the start of `rest`.
    fn match_at(&self, rest: &str) -> Option<usize> {
        let first = rest.chars().next()?;
        let bucket = self.by_first.get(&first)?;
        bucket.iter().find_map(|designation| {
            if !rest.starts_with(designation) {
                return None;
            }
            let ends_token = rest[designation.len()..]
                .chars()
                .next()
                .map_or(true, |next| !is_word_char(next));
            ends_token.then_some(designation.len())
        })
    }
}

/// Output of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    /// Linked designations that had no description, in first-seen order.
    pub unresolved: Vec<Designation>,
}

/// Resolves designators against a fixed character table.
///
/// Build it once per corpus; each call may layer call-site overrides from
/// character links on top without touching the shared table.
#[derive(Debug, Clone)]
pub struct ReferenceResolver<'a> {
    table: FxHashMap<&'a str, &'a str>,
    index: DesignatorIndex<'a>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(table: FxHashMap<&'a str, &'a str>) -> Self {
        let index = DesignatorIndex::new(table.keys().copied());
        Self { table, index }
    }

    pub fn resolve(&self, text: &str, character_links: &[CharacterLink]) -> String {
        self.resolve_with_report(text, character_links).text
    }

    pub fn resolve_with_report(&self, text: &str, character_links: &[CharacterLink]) -> Resolution {
        let has_overrides = character_links.iter().any(|l| l.description.is_some());

        let (lookup, index): (Cow<'_, FxHashMap<&str, &str>>, Cow<'_, DesignatorIndex<'_>>) =
            if has_overrides {
                let mut lookup: FxHashMap<&str, &str> = self.table.clone();
                for link in character_links {
                    if let Some(description) = link.description.as_deref() {
                        lookup.insert(link.designation.as_str(), description);
                    }
                }
                let index = DesignatorIndex::new(lookup.keys().copied());
                (Cow::Owned(lookup), Cow::Owned(index))
            } else {
                (Cow::Borrowed(&self.table), Cow::Borrowed(&self.index))
            };

        let mut out = String::with_capacity(text.len());
        for segment in index.tokenize(text) {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Designator(d) => match lookup.get(d) {
                    Some(description) => out.push_str(description),
                    None => out.push_str(d),
                },
            }
        }

        let mut unresolved: Vec<Designation> = Vec::new();
        for link in character_links {
            if !lookup.contains_key(link.designation.as_str())
                && !unresolved.contains(&link.designation)
            {
                tracing::debug!(designation = %link.designation, "unresolved character link");
                unresolved.push(link.designation.clone());
            }
        }

        Resolution {
            text: out,
            unresolved,
        }
    }
}

/// One-shot resolution against a designation -> description table.
pub fn resolve(
    text: &str,
    character_links: &[CharacterLink],
    characters: &FxHashMap<&str, &str>,
) -> String {
    ReferenceResolver::new(characters.clone()).resolve(text, character_links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table<'a>(pairs: &[(&'a str, &'a str)]) -> FxHashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn longest_designation_wins() {
        let chars = table(&[("A", "a young lawyer"), ("A-2", "the lawyer's rival")]);
        let out = resolve("A-2 challenges A", &[], &chars);
        assert_eq!(out, "the lawyer's rival challenges a young lawyer");
    }

    #[test]
    fn prefix_family_never_mangled() {
        let chars = table(&[("A", "Alice"), ("A-2", "Anna"), ("A-3", "Amy")]);
        let out = resolve("A-3, A-2 and A met; A-3 left.", &[], &chars);
        assert_eq!(out, "Amy, Anna and Alice met; Amy left.");
        assert!(!out.contains("-2"));
        assert!(!out.contains("-3"));
    }

    #[test]
    fn no_match_inside_longer_words() {
        let chars = table(&[("A", "Alice"), ("B", "Bob")]);
        let out = resolve("A and Bertha saw B. ABBA sang.", &[], &chars);
        assert_eq!(out, "Alice and Bertha saw Bob. ABBA sang.");
    }

    #[test]
    fn possessive_and_punctuation_are_boundaries() {
        let chars = table(&[("B", "the heiress")]);
        assert_eq!(
            resolve("B's fortune (B) is lost.", &[], &chars),
            "the heiress's fortune (the heiress) is lost."
        );
    }

    #[test]
    fn unknown_designations_left_untouched() {
        let chars = table(&[("A", "Alice")]);
        let resolver = ReferenceResolver::new(chars);
        let report = resolver.resolve_with_report(
            "A distrusts X",
            &[CharacterLink::new("A"), CharacterLink::new("X")],
        );
        assert_eq!(report.text, "Alice distrusts X");
        assert_eq!(report.unresolved, vec![Designation::from("X")]);
    }

    #[test]
    fn descriptions_are_not_rescanned() {
        // "B" appears inside A's description and must survive verbatim.
        let chars = table(&[("A", "the friend of B"), ("B", "Bob")]);
        assert_eq!(resolve("A greets B", &[], &chars), "the friend of B greets Bob");
    }

    #[test]
    fn link_descriptions_override_table() {
        let chars = table(&[("A", "Alice"), ("B", "Bob")]);
        let links = [CharacterLink::with_description("A", "the captain")];
        assert_eq!(resolve("A meets B", &links, &chars), "the captain meets Bob");
        // Shared table unchanged.
        assert_eq!(resolve("A meets B", &[], &chars), "Alice meets Bob");
    }

    #[test]
    fn override_can_introduce_new_designation() {
        let chars = table(&[("A", "Alice")]);
        let links = [CharacterLink::with_description("SN-A", "Alice's son")];
        assert_eq!(resolve("A and SN-A", &links, &chars), "Alice and Alice's son");
    }

    #[test]
    fn resolution_is_repeatable() {
        let chars = table(&[("A", "Alice"), ("A-2", "Anna"), ("FB", "a friend")]);
        let resolver = ReferenceResolver::new(chars);
        let first = resolver.resolve("FB warns A-2 about A", &[]);
        let second = resolver.resolve("FB warns A-2 about A", &[]);
        assert_eq!(first, second);
        assert_eq!(first, "a friend warns Anna about Alice");
    }

    #[test]
    fn tokenize_segments() {
        let index = DesignatorIndex::new(["A", "A-2"]);
        assert_eq!(
            index.tokenize("A-2 loves A."),
            vec![
                Segment::Designator("A-2"),
                Segment::Literal(" loves "),
                Segment::Designator("A"),
                Segment::Literal("."),
            ]
        );
        assert!(index.tokenize("").is_empty());
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        let chars = table(&[("A", "Zoë")]);
        assert_eq!(resolve("Née A, au café", &[], &chars), "Née Zoë, au café");
    }
}
