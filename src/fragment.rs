//! Fragment files and the category names derived from them.
//!
//! A fragment is one markdown file contributing a slice of the specification. Besides its
//! location it carries a category: the title part of its file name in kebab case, which is what
//! section renumbering rules are keyed by.

use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
/// A source file contributing content to the compiled document.
pub struct Fragment {
    /// Location on disk.
    pub path: PathBuf,
    /// Location relative to the specification root; encodes category and ordering tokens.
    pub relative: PathBuf,
    /// Kebab-case title taken from the file name, e.g. `unions` for `04a_Unions.md`.
    pub category: String,
}

impl Fragment {
    #[must_use]
    /// Describe the file at `path` found under `root`.
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative = path.strip_prefix(root).map_or_else(
            |_| PathBuf::from(path.file_name().unwrap_or(path.as_os_str())),
            Path::to_path_buf,
        );
        let category = category_of(&path);
        Self {
            path,
            relative,
            category,
        }
    }
}

/// A fragment is ordered by its path relative to the specification root.
impl AsRef<Path> for Fragment {
    fn as_ref(&self) -> &Path {
        &self.relative
    }
}

#[must_use]
/// Category of a fragment path: the part of the file stem after the first `_`, kebab-cased.
///
/// `01-1_Introduction.md` gives `introduction`, `02_ArraysAndSlices.md` gives
/// `arrays-and-slices`, and a stem without an underscore is used whole.
pub fn category_of(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let title = stem.split_once('_').map_or(stem.as_str(), |(_, title)| title);
    category_name(title)
}

#[must_use]
/// Kebab-case form of a title: `SelfType` and `Self Type` both become `self-type`.
pub fn category_name(title: &str) -> String {
    let mut out = String::with_capacity(title.len() + 4);
    let mut prev: Option<char> = None;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            let boundary = ch.is_uppercase()
                && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            if boundary && !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
        prev = Some(ch);
    }

    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
#[path = "tests/fragment.rs"]
mod tests;
