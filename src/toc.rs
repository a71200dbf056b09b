//! Table of contents accumulated while fragments are processed.

use crate::anchor::anchor;
use crate::heading::{ClassifiedHeading, HeadingKind};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// One line of the table of contents.
pub struct TocEntry {
    /// 1 for chapters, 2 for major sections.
    pub depth: usize,
    /// Heading text as written, number included.
    pub text: String,
    /// Link target derived from the heading text.
    pub anchor: String,
}

#[derive(Debug, Default)]
/// Ordered chapter and major-section entries, in encounter order.
pub struct TocBuilder {
    entries: Vec<TocEntry>,
}

impl TocBuilder {
    #[must_use]
    /// Empty table of contents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heading; anything but chapters and major sections is ignored.
    pub fn push(&mut self, heading: &ClassifiedHeading<'_>) {
        let depth = match heading.kind {
            HeadingKind::Chapter => 1,
            HeadingKind::MajorSection => 2,
            HeadingKind::Subsection | HeadingKind::Plain => return,
        };
        let text = heading.heading.text;
        self.entries.push(TocEntry {
            depth,
            text: text.to_string(),
            anchor: anchor(text),
        });
    }

    #[must_use]
    /// Consume the builder, keeping its entries.
    pub fn into_entries(self) -> Vec<TocEntry> {
        self.entries
    }
}

#[must_use]
/// Render entries as a markdown list under a `Table of Contents` heading, closed by a rule.
///
/// Chapters are bold and top-level; sections are indented once beneath the latest chapter. A
/// section seen before any chapter has nothing to nest under and stays top-level.
pub fn render(entries: &[TocEntry]) -> String {
    let mut out = String::from("# Table of Contents\n\n");
    let mut in_chapter = false;

    for entry in entries {
        let link = format!("[{}](#{})", entry.text, entry.anchor);
        if entry.depth == 1 {
            in_chapter = true;
            out.push_str(&format!("- **{link}**\n"));
        } else if in_chapter {
            out.push_str(&format!("  - {link}\n"));
        } else {
            out.push_str(&format!("- {link}\n"));
        }
    }

    out.push_str("\n---\n\n");
    out
}

#[cfg(test)]
#[path = "tests/toc.rs"]
mod tests;
