//! Category-scoped rewriting of legacy section numbers.
//!
//! The legacy numbering reused the same numbers for unrelated material: old §6 is arrays in one
//! file and traits in another, old §8 is records but old §8.5 is unions. A number on its own
//! therefore says nothing about where it should go. Every rule here is keyed by the category of
//! the file being rewritten, and within a category the most specific old prefix wins, so such
//! collisions are spelled out as table entries instead of being guessed from context.
//!
//! Four places carry section numbers and are rewritten:
//!
//! - heading lines starting with a number (`### 7.2 Layout`), whose level also shifts so the
//!   heading nests correctly under its new parent; the heading numbered exactly as the rule's
//!   prefix has its own shift, since it usually keeps its level while its subsections move,
//! - cross references in parentheses (`(§7.2)`),
//! - metadata markers (`**Section**: §7`),
//! - numbered formal labels (`Definition 5.1.2`).

use crate::error::Error;
use crate::fragment::category_name;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static HEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^( {0,3})(#{1,6})([ \t]+)(§?)(\d+(?:\.\d+)*)\.?([ \t]+|$)")
        .expect("valid regex")
});
static CROSS_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(§(\d+(?:\.\d+)*)\)").expect("valid regex"));
static SECTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\*\*Section\*\*:[ \t]*§)(\d+(?:\.\d+)*)").expect("valid regex")
});
static FORMAL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Definition|Theorem|Lemma|Corollary)([ \t]+)(\d+(?:\.\d+)+)")
        .expect("valid regex")
});

/// Legacy type-system chapter layout: category, old prefix, new prefix, title shift, heading
/// shift.
const LEGACY_TYPE_SYSTEM: &[(&str, &[u32], &[u32], i8, i8)] = &[
    ("integers", &[5, 1], &[2, 1, 1], 0, 2),
    ("floating-point", &[5, 2], &[2, 1, 2], 0, 2),
    ("boolean", &[5, 3], &[2, 1, 3], 0, 2),
    ("character", &[5, 4], &[2, 1, 4], 0, 2),
    ("never", &[5, 5], &[2, 1, 5], 0, 2),
    ("string", &[5, 6], &[2, 1, 6], 0, 2),
    ("tuples", &[7], &[2, 2, 1], 0, 1),
    ("records", &[8], &[2, 2, 2], 0, 1),
    ("records", &[8, 5], &[2, 3, 2], 0, 0),
    ("records", &[8, 8], &[2, 2, 3], -1, -1),
    ("unions", &[8, 5], &[2, 3, 2], 0, 0),
    ("enums", &[9], &[2, 3, 1], 0, 0),
    ("modals", &[12], &[2, 3, 3], 0, 0),
    ("arrays-and-slices", &[6], &[2, 4], 0, 0),
    ("pointers", &[9], &[2, 5], 0, 0),
    ("traits", &[6], &[2, 6], 0, 0),
    ("generics", &[11], &[2, 7], 0, 0),
    ("map-types", &[10], &[2, 8], 0, 0),
    ("type-aliases", &[11], &[2, 9], 0, 0),
    ("self-type", &[12], &[2, 10], 0, 0),
];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
/// One `(category, old) -> new` entry as written in a map file.
pub struct RenumberRule {
    /// Category the rule applies to; compared in kebab case.
    pub category: String,
    /// Legacy section number prefix, e.g. `8` or `8.5`.
    pub old: String,
    /// Replacement prefix, e.g. `2.2.2`.
    pub new: String,
    /// Levels added to (or, if negative, removed from) headings numbered below `old`.
    #[serde(default)]
    pub heading_shift: i8,
    /// Levels added to (or removed from) the heading numbered exactly `old`.
    #[serde(default)]
    pub title_shift: i8,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
/// On-disk JSON shape of a section number map.
pub struct MapFile {
    /// All rules, in any order.
    pub rules: Vec<RenumberRule>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct CompiledRule {
    old: Vec<u32>,
    new: Vec<u32>,
    title_shift: i8,
    heading_shift: i8,
}

#[derive(Clone, Debug, Default)]
/// Unambiguous renumbering rules grouped by category.
pub struct SectionNumberMap {
    categories: BTreeMap<String, Vec<CompiledRule>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Rewritten text and how many numbers of each kind changed.
pub struct Renumbered {
    /// Text after rewriting.
    pub text: String,
    /// Heading lines renumbered.
    pub headings: usize,
    /// Parenthesised cross references renumbered.
    pub references: usize,
    /// `**Section**:` markers renumbered.
    pub markers: usize,
    /// Definition/theorem style labels renumbered.
    pub labels: usize,
}

impl Renumbered {
    #[must_use]
    /// Total number of rewrites.
    pub fn total(&self) -> usize {
        self.headings + self.references + self.markers + self.labels
    }
}

fn parse_number(number: &str) -> Option<Vec<u32>> {
    let number = number.strip_prefix('§').unwrap_or(number);
    let number = number.strip_suffix('.').unwrap_or(number);
    number
        .split('.')
        .map(|part| part.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()
        .filter(|parts| !parts.is_empty())
}

fn join_number(parts: &[u32]) -> String {
    parts
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn shift_level(level: usize, shift: i8) -> usize {
    let shifted = level.saturating_add_signed(isize::from(shift));
    shifted.clamp(1, 6)
}

impl SectionNumberMap {
    /// Build a map from rules, rejecting conflicting entries.
    ///
    /// A rule repeated verbatim is accepted once.
    ///
    /// # Errors
    ///
    /// Returns an error if a number is not dotted decimal, or if one category maps the same old
    /// number to two different targets.
    pub fn new<I: IntoIterator<Item = RenumberRule>>(rules: I) -> Result<Self, Error> {
        let mut map = Self::default();
        for rule in rules {
            let old =
                parse_number(&rule.old).ok_or_else(|| Error::InvalidSectionNumber(rule.old.clone()))?;
            let new =
                parse_number(&rule.new).ok_or_else(|| Error::InvalidSectionNumber(rule.new.clone()))?;
            map.insert(
                category_name(&rule.category),
                CompiledRule {
                    old,
                    new,
                    title_shift: rule.title_shift,
                    heading_shift: rule.heading_shift,
                },
            )?;
        }
        Ok(map)
    }

    /// Load a map from a JSON file of the [`MapFile`] shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the rules are ambiguous.
    pub fn from_json(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: MapFile = serde_json::from_str(&contents).map_err(|source| Error::MapFormat {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file.rules)
    }

    #[must_use]
    /// The legacy type-system chapter layout.
    ///
    /// Arrays and traits both used §6, enums and pointers §9, generics and aliases §11, modals
    /// and the self type §12. Records link to unions as §8.5, which is why the records category
    /// carries its own §8.5 entry.
    pub fn legacy_type_system() -> Self {
        let mut categories: BTreeMap<String, Vec<CompiledRule>> = BTreeMap::new();
        for &(category, old, new, title_shift, heading_shift) in LEGACY_TYPE_SYSTEM {
            categories
                .entry(category.to_string())
                .or_default()
                .push(CompiledRule {
                    old: old.to_vec(),
                    new: new.to_vec(),
                    title_shift,
                    heading_shift,
                });
        }
        for rules in categories.values_mut() {
            rules.sort_by(|a, b| b.old.len().cmp(&a.old.len()));
        }
        Self { categories }
    }

    fn insert(&mut self, category: String, rule: CompiledRule) -> Result<(), Error> {
        let rules = self.categories.entry(category.clone()).or_default();
        if let Some(existing) = rules.iter().find(|r| r.old == rule.old) {
            if *existing == rule {
                return Ok(());
            }
            return Err(Error::AmbiguousMapping {
                category,
                old: join_number(&rule.old),
                first: join_number(&existing.new),
                second: join_number(&rule.new),
            });
        }
        rules.push(rule);
        rules.sort_by(|a, b| b.old.len().cmp(&a.old.len()));
        Ok(())
    }

    #[must_use]
    /// Whether any rule applies to `category`.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(&category_name(category))
    }

    #[must_use]
    /// Whether the map has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    /// Categories with at least one rule.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    fn rules(&self, category: &str) -> &[CompiledRule] {
        self.categories
            .get(&category_name(category))
            .map_or(&[][..], Vec::as_slice)
    }

    fn rewrite(rules: &[CompiledRule], number: &str) -> Option<(String, i8)> {
        let parts = parse_number(number)?;
        let rule = rules.iter().find(|r| parts.starts_with(&r.old))?;
        let mut renumbered = rule.new.clone();
        renumbered.extend_from_slice(&parts[rule.old.len()..]);
        let shift = if parts.len() == rule.old.len() {
            rule.title_shift
        } else {
            rule.heading_shift
        };
        Some((join_number(&renumbered), shift))
    }

    #[must_use]
    /// New number for `number` in `category`, or `None` when no rule covers it.
    pub fn lookup(&self, category: &str, number: &str) -> Option<String> {
        Self::rewrite(self.rules(category), number).map(|(new, _)| new)
    }

    #[must_use]
    /// Rewrite every section number in `text` using the rules of `category` only.
    pub fn renumber(&self, category: &str, text: &str) -> Renumbered {
        let rules = self.rules(category);
        let mut out = Renumbered::default();
        if rules.is_empty() {
            out.text = text.to_string();
            return out;
        }

        let lines: Vec<String> = text
            .split('\n')
            .map(|line| match Self::rewrite_heading(rules, line) {
                Some(rewritten) => {
                    out.headings += 1;
                    rewritten
                }
                None => line.to_string(),
            })
            .collect();
        let text = lines.join("\n");

        let text = CROSS_REFERENCE.replace_all(&text, |caps: &Captures<'_>| {
            match Self::rewrite(rules, &caps[1]) {
                Some((new, _)) => {
                    out.references += 1;
                    format!("(§{new})")
                }
                None => caps[0].to_string(),
            }
        });
        let text = SECTION_MARKER.replace_all(&text, |caps: &Captures<'_>| {
            match Self::rewrite(rules, &caps[2]) {
                Some((new, _)) => {
                    out.markers += 1;
                    format!("{}{new}", &caps[1])
                }
                None => caps[0].to_string(),
            }
        });
        let text = FORMAL_LABEL.replace_all(&text, |caps: &Captures<'_>| {
            match Self::rewrite(rules, &caps[3]) {
                Some((new, _)) => {
                    out.labels += 1;
                    format!("{}{}{new}", &caps[1], &caps[2])
                }
                None => caps[0].to_string(),
            }
        });

        out.text = text.into_owned();
        out
    }

    fn rewrite_heading(rules: &[CompiledRule], line: &str) -> Option<String> {
        let caps = HEADING_NUMBER.captures(line)?;
        let (new, shift) = Self::rewrite(rules, &caps[5])?;
        let level = shift_level(caps[2].len(), shift);
        let rest = &line[caps.get(0)?.end()..];
        Some(format!(
            "{}{}{}{}{new}{}{rest}",
            &caps[1],
            "#".repeat(level),
            &caps[3],
            &caps[4],
            &caps[6],
        ))
    }
}

#[cfg(test)]
#[path = "tests/renumber.rs"]
mod tests;
