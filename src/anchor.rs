//! Heading text to link anchor conversion.
//!
//! The compiled document is rendered by a platform that derives heading ids itself, and the
//! table of contents links to those ids. The conversion here has to agree with the renderer
//! character for character: section numbers and stable labels are dropped, the rest is
//! lowercased, punctuation removed and whitespace hyphenated.

use regex::Regex;
use std::sync::LazyLock;

static SECTION_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"§[\d.]+\s*").expect("valid regex"));
static STABLE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[\w.]+\]").expect("valid regex"));
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

#[must_use]
/// Anchor for a heading's text, independent of any section number prefix.
pub fn anchor(text: &str) -> String {
    let text = SECTION_NUMBER.replace_all(text, "");
    let text = STABLE_LABEL.replace_all(&text, "");
    let lowered = text.to_lowercase();
    let kept = PUNCTUATION.replace_all(lowered.trim(), "");
    SEPARATORS.replace_all(&kept, "-").into_owned()
}

#[cfg(test)]
#[path = "tests/anchor.rs"]
mod tests;
