//! Format trait and implementations for the document types fragments are written in.
//!
//! This module defines the `Format` trait which abstracts over document formats by providing
//! the tree-sitter language and the query that locates headings in it. Heading classification
//! itself is line based, the grammar only decides which lines really are headings (and not, say,
//! a `#` comment inside a fenced code block).

pub mod markdown;

/// Tree-sitter grammar and heading query for one document format.
pub trait Format {
    /// Grammar used to parse a whole fragment.
    fn language(&self) -> tree_sitter::Language;
    /// Query whose captures are the heading nodes of a parsed fragment.
    fn heading_query(&self) -> &str;
}
