//! Reading order of fragment files, derived purely from their paths.
//!
//! Fragments live in `{NN}_{Category}/{clause}-{sub}_{Title}.md` and the reserved annex directory
//! holds `{Letter}_{Title}.md`. The key built here orders by category number, then clause, then
//! sub-number, then file name, with every annex file after every numbered category. Paths that
//! follow neither convention still get a key, so discovery never loses a fragment.

use regex::Regex;
use std::path::{Component, Path};
use std::sync::LazyLock;

/// Primary key of annex material: strictly above any numbered category.
pub const ANNEX_RANK: u64 = u64::MAX;

static CATEGORY_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)_").expect("valid regex"));
static CLAUSE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-(\d+)_").expect("valid regex"));
static ANNEX_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z])_").expect("valid regex"));

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
/// Lexicographically ordered position of a fragment in the compiled document.
pub struct SortKey {
    /// Category number, or [`ANNEX_RANK`] for annex files.
    pub category: u64,
    /// Clause number, or the annex letter's code point.
    pub clause: u64,
    /// Sub-number within the clause.
    pub sub: u64,
    /// Final tie-break: file name, or the whole relative path for unrecognised layouts.
    pub name: String,
}

impl SortKey {
    fn fallback(relative: &Path) -> Self {
        Self {
            category: 0,
            clause: 0,
            sub: 0,
            name: relative.to_string_lossy().into_owned(),
        }
    }
}

fn parse_number(digits: &str) -> Option<u64> {
    digits.parse::<u32>().ok().map(u64::from)
}

#[must_use]
/// Whether a directory name follows the `{NN}_{Category}` convention.
pub fn is_category_dir(name: &str) -> bool {
    CATEGORY_DIR
        .captures(name)
        .and_then(|caps| parse_number(&caps[1]))
        .is_some()
}

#[must_use]
/// Sort key for a fragment path relative to the specification root.
///
/// `annex_dir` names the reserved directory whose files follow all numbered categories.
pub fn sort_key(relative: &Path, annex_dir: &str) -> SortKey {
    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    let [dir_name, file_name] = parts.as_slice() else {
        return SortKey::fallback(relative);
    };

    if *dir_name == annex_dir {
        let letter = ANNEX_FILE
            .captures(file_name)
            .and_then(|caps| caps[1].chars().next())
            .map_or(0, u64::from);
        return SortKey {
            category: ANNEX_RANK,
            clause: letter,
            sub: 0,
            name: (*file_name).to_string(),
        };
    }

    let Some(category) = CATEGORY_DIR
        .captures(dir_name)
        .and_then(|caps| parse_number(&caps[1]))
    else {
        return SortKey::fallback(relative);
    };

    let (clause, sub) = CLAUSE_FILE
        .captures(file_name)
        .and_then(|caps| Some((parse_number(&caps[1])?, parse_number(&caps[2])?)))
        .unwrap_or((0, 0));

    SortKey {
        category,
        clause,
        sub,
        name: (*file_name).to_string(),
    }
}

/// Sort relative fragment paths into reading order.
pub fn resolve<P: AsRef<Path>>(paths: &mut [P], annex_dir: &str) {
    paths.sort_by_cached_key(|p| sort_key(p.as_ref(), annex_dir));
}

#[cfg(test)]
#[path = "tests/order.rs"]
mod tests;
