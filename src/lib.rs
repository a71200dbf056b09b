//! colophon: assemble a specification authored as many markdown fragments into one document.
//!
//! Fragments are ordered by the numbering encoded in their paths, stripped of per-file
//! navigation scaffolding, optionally renumbered into a new section scheme, deduplicated at the
//! heading level and concatenated beneath a generated table of contents.
#![allow(clippy::multiple_crate_versions)]

pub mod anchor;
pub mod assemble;
pub mod config;
pub mod dedup;
pub mod error;
pub mod formats;
pub mod fragment;
pub mod heading;
pub mod order;
pub mod renumber;
pub mod strip;
pub mod toc;

pub use assemble::{Assembler, CompiledDocument, Report, Warning};
pub use error::Error;
