//! Errors that abort a compilation run.
//!
//! Problems confined to a single fragment never surface here: they become
//! [`Warning`](crate::assemble::Warning)s in the run report and the fragment is
//! skipped. What remains are failures of the environment itself, such as a
//! missing specification root, an unwritable output path or an unusable
//! section number map.

use std::io;
use std::path::PathBuf;

/// Fatal failures of a compilation or renumbering run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The specification root does not exist or is not a directory.
    #[error("specification root {0} is not a directory")]
    MissingRoot(PathBuf),

    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The compiled output (or a rewritten fragment) could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The markdown grammar is incompatible with the linked tree-sitter runtime.
    #[error("markdown grammar unavailable: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The heading query failed to compile against the markdown grammar.
    #[error("invalid heading query: {0}")]
    Query(#[from] tree_sitter::QueryError),

    /// A section number map file is not valid JSON of the expected shape.
    #[error("invalid section number map {path}: {source}")]
    MapFormat {
        /// Map file path.
        path: PathBuf,
        /// Deserialisation failure.
        source: serde_json::Error,
    },

    /// Two rules map the same old number to different targets within one category.
    #[error("ambiguous mapping for §{old} in category {category:?}: §{first} vs §{second}")]
    AmbiguousMapping {
        /// Category both rules belong to.
        category: String,
        /// Legacy section number claimed twice.
        old: String,
        /// Target of the rule seen first.
        first: String,
        /// Conflicting target.
        second: String,
    },

    /// A mapping rule contains something other than a dotted decimal number.
    #[error("invalid section number {0:?}")]
    InvalidSectionNumber(String),
}
