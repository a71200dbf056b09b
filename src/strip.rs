//! Removal of per-fragment scaffolding that must not reach the compiled document.
//!
//! Each fragment is authored to be read on its own, so it opens with a metadata block (title,
//! section marker, navigation links, closed by a rule line) and ends with a Previous/Next footer.
//! Paragraphs additionally carry bracketed ordinals. All three are artefacts of the per-file
//! layout and are stripped here as plain text transforms.

use crate::heading::{clause_identifier, Heading};
use regex::Regex;
use std::sync::LazyLock;

/// Footer markers; a line holding either one is navigation, not content.
pub const FOOTER_MARKERS: [&str; 2] = ["**Previous**:", "**Next**:"];

/// Marker of the section line in a fragment's metadata block.
pub const SECTION_MARKER: &str = "**Section**:";

static PARAGRAPH_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)(?:\[\d+\][ \t]+)+(\S)").expect("valid regex")
});
static STABLE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\w+(?:\.\w+)+\]").expect("valid regex"));

fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_footer_line(line: &str) -> bool {
    FOOTER_MARKERS.iter().any(|m| line.contains(*m))
}

fn is_metadata_line(line: &str) -> bool {
    line.contains(SECTION_MARKER) || is_footer_line(line) || STABLE_LABEL.is_match(line)
}

fn is_title_line(line: &str) -> bool {
    Heading::parse(line).is_some_and(|h| h.level == 1)
}

fn is_chapter_line(line: &str) -> bool {
    Heading::parse(line).is_some_and(|h| h.level == 2 && clause_identifier(h.text).is_some())
}

#[must_use]
/// Drop a leading metadata block, keeping any chapter heading nested inside it.
///
/// The block starts at the first non-blank line, which must be a level-1 heading, and ends at
/// the first rule line after it. Between the two there must be at least one metadata line: a
/// `**Section**:` marker, a navigation link or a `[stable.label]`. Blank lines directly after
/// the rule are swallowed too. When the text does not open with such a block it is returned
/// unchanged, so a body that starts with a title and later has a thematic break survives.
pub fn strip_metadata_header(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let Some(start) = lines.iter().position(|l| !is_blank(l)) else {
        return text.to_string();
    };
    if !is_title_line(lines[start]) {
        return text.to_string();
    }
    let Some(end) = lines[start + 1..]
        .iter()
        .position(|l| is_rule(l))
        .map(|offset| start + 1 + offset)
    else {
        return text.to_string();
    };
    if !lines[start + 1..end].iter().any(|l| is_metadata_line(l)) {
        return text.to_string();
    }

    let mut result: Vec<&str> = Vec::with_capacity(lines.len() - end);
    for &line in &lines[start + 1..end] {
        if is_chapter_line(line) {
            result.push(line);
            result.push("");
        }
    }

    let body_start = lines[end + 1..]
        .iter()
        .position(|l| !is_blank(l))
        .map_or(lines.len(), |offset| end + 1 + offset);
    result.extend_from_slice(&lines[body_start..]);

    result.join("\n")
}

#[must_use]
/// Drop a trailing Previous/Next navigation footer found within the last `window` lines.
///
/// The footer is the run of navigation lines (and blanks) that ends the text; it must start
/// within the window. Everything from its first line onwards is removed. If the closest
/// non-blank line above it is a rule, the rule goes too. Navigation lines followed by other
/// content are left alone.
pub fn strip_navigation_footer(text: &str, window: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let lowest = lines.len().saturating_sub(window);

    let content_end = lines
        .iter()
        .rposition(|l| !is_blank(l) && !is_footer_line(l))
        .map_or(0, |i| i + 1);
    let from = content_end.max(lowest);

    let Some(footer) = lines[from..]
        .iter()
        .position(|l| is_footer_line(l))
        .map(|offset| from + offset)
    else {
        return text.to_string();
    };

    let above = lines[..footer].iter().rposition(|l| !is_blank(l));
    let cut = match above {
        Some(i) if is_rule(lines[i]) => i,
        _ => footer,
    };

    lines[..cut].join("\n")
}

#[must_use]
/// Strip both the metadata header and the navigation footer.
pub fn strip_navigation(text: &str, window: usize) -> String {
    strip_navigation_footer(&strip_metadata_header(text), window)
}

#[must_use]
/// Remove bracketed paragraph ordinals such as `[3]` from the start of lines.
///
/// An ordinal is only removed when more text follows on the same line, and indentation in front
/// of it is kept. Runs like `[1] [2]` are removed together so that a second pass changes nothing.
pub fn strip_paragraph_numbers(text: &str) -> String {
    PARAGRAPH_NUMBER.replace_all(text, "$1$2").into_owned()
}

#[cfg(test)]
#[path = "tests/strip.rs"]
mod tests;
