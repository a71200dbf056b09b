//! Heading recognition and classification.
//!
//! A line counts as a heading when it has the ATX shape (`#` to `######`, whitespace, text) and
//! the markdown grammar agrees that it is a heading node, which rules out look-alikes inside code
//! blocks. Recognised headings are then sorted into the four kinds the table of contents cares
//! about by fixed pattern rules on their text.

use crate::error::Error;
use crate::formats::Format;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser, Query, QueryCursor};

static ATX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(#{1,6})[ \t]+(.+)$").expect("valid regex"));
static CLAUSE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Clause\s+\d+|Annex\s+[A-Z])(?:\s*[—–:-]|\s*$)").expect("valid regex")
});
static TWO_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^§?\d+\.\d+\.?\s+\S").expect("valid regex"));
static THREE_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^§?\d+\.\d+\.\d+").expect("valid regex"));

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// An ATX heading borrowed from the line it was parsed from.
pub struct Heading<'a> {
    /// Number of leading `#` markers (1 to 6).
    pub level: usize,
    /// Heading text after the markers, trimmed.
    pub text: &'a str,
}

impl<'a> Heading<'a> {
    #[must_use]
    /// Parse a single line as an ATX heading, indented by at most three spaces.
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = ATX.captures(line)?;
        let markers = caps.get(1)?;
        let text = caps.get(2)?.as_str().trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            level: markers.len(),
            text,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Role a heading plays in the compiled document's structure.
pub enum HeadingKind {
    /// A level-2 clause or annex title; top-level TOC entry.
    Chapter,
    /// A level-3 `§N.N` section; indented TOC entry.
    MajorSection,
    /// A `§N.N.N` (or deeper) section at any level; body only.
    Subsection,
    /// Any other heading; body only.
    Plain,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A heading together with its kind and, for chapters, the clause it opens.
pub struct ClassifiedHeading<'a> {
    /// The heading as written.
    pub heading: Heading<'a>,
    /// Structural role.
    pub kind: HeadingKind,
    /// Normalised clause identifier such as `Clause 3` or `Annex B`.
    pub clause: Option<String>,
}

#[must_use]
/// Normalised clause or annex identifier at the start of heading text, if any.
///
/// The identifier is coarser than the heading text: `Clause 1 — Introduction` and
/// `Clause 1 - Intro` both yield `Clause 1`.
pub fn clause_identifier(text: &str) -> Option<String> {
    CLAUSE_MARKER
        .captures(text)
        .map(|caps| caps[1].split_whitespace().collect::<Vec<_>>().join(" "))
}

#[must_use]
/// Classify a heading by level and text.
///
/// Three-component numbers win over everything else, so a deep section is never promoted into
/// the table of contents by being written at a shallow level.
pub fn classify(heading: Heading<'_>) -> ClassifiedHeading<'_> {
    let (kind, clause) = if THREE_COMPONENT.is_match(heading.text) {
        (HeadingKind::Subsection, None)
    } else if heading.level == 2 {
        match clause_identifier(heading.text) {
            Some(id) => (HeadingKind::Chapter, Some(id)),
            None => (HeadingKind::Plain, None),
        }
    } else if heading.level == 3 && TWO_COMPONENT.is_match(heading.text) {
        (HeadingKind::MajorSection, None)
    } else {
        (HeadingKind::Plain, None)
    };
    ClassifiedHeading {
        heading,
        kind,
        clause,
    }
}

/// Locates real heading lines in a fragment with a tree-sitter grammar.
pub struct HeadingScanner {
    parser: Parser,
    query: Query,
}

impl HeadingScanner {
    /// Build a scanner for the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or the heading query does not compile.
    pub fn new<F: Format>(format: &F) -> Result<Self, Error> {
        let language = format.language();
        let mut parser = Parser::new();
        parser.set_language(&language)?;
        let query = Query::new(&language, format.heading_query())?;
        Ok(Self { parser, query })
    }

    /// Zero-based line numbers on which a heading node starts.
    ///
    /// Returns `None` when the parser gives up on the text.
    pub fn heading_rows(&mut self, text: &str) -> Option<HashSet<usize>> {
        let tree = self.parser.parse(text, None)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, tree.root_node(), text.as_bytes());

        let mut rows = HashSet::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                rows.insert(capture.node.start_position().row);
            }
        }
        Some(rows)
    }
}

#[cfg(test)]
#[path = "tests/heading.rs"]
mod tests;
