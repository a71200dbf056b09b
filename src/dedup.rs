//! Run-scoped heading deduplication.
//!
//! Fragments re-introduce the headings of the section they belong to, so the same clause title
//! shows up once per fragment file. `DedupState` remembers what a run has already emitted and
//! decides, heading by heading, whether a line survives and whether it reaches the table of
//! contents. It is created per compilation run and passed along explicitly; two runs never share
//! one.

use crate::heading::{ClassifiedHeading, HeadingKind};
use clap::ValueEnum;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
/// Granularity at which repeated headings are removed from the body.
pub enum DedupPolicy {
    /// Drop any heading line identical to one already emitted; chapters reach the TOC once per
    /// clause identifier.
    #[default]
    ExactLine,
    /// Drop only repeated chapter headings, compared by clause identifier, together with the
    /// blank line that follows them.
    #[value(alias = "clause")]
    ClauseIdentifier,
}

impl DedupPolicy {
    #[must_use]
    /// Parse a policy name as written in colophon.toml.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What to do with a heading line.
pub enum Admission {
    /// Emit the line; `toc` says whether it also gets a TOC entry.
    Keep {
        /// Whether the heading is listed in the table of contents.
        toc: bool,
    },
    /// Leave the line out of the body.
    Drop {
        /// Whether one directly following blank line goes as well.
        swallow_blank: bool,
    },
}

#[derive(Debug, Default)]
/// Headings and clause identifiers already emitted during one run.
pub struct DedupState {
    policy: DedupPolicy,
    seen_lines: HashSet<String>,
    seen_clauses: HashSet<String>,
    removed: usize,
}

impl DedupState {
    #[must_use]
    /// Fresh state for a new run.
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    /// Number of heading lines dropped so far.
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Decide the fate of a heading `line`, recording it as seen.
    pub fn admit(&mut self, line: &str, heading: &ClassifiedHeading<'_>) -> Admission {
        match self.policy {
            DedupPolicy::ExactLine => {
                if !self.seen_lines.insert(line.to_string()) {
                    self.removed += 1;
                    return Admission::Drop {
                        swallow_blank: false,
                    };
                }
                let toc = match (heading.kind, &heading.clause) {
                    (HeadingKind::Chapter, Some(id)) => self.seen_clauses.insert(id.clone()),
                    (HeadingKind::MajorSection, _) => true,
                    _ => false,
                };
                Admission::Keep { toc }
            }
            DedupPolicy::ClauseIdentifier => match (heading.kind, &heading.clause) {
                (HeadingKind::Chapter, Some(id)) => {
                    if self.seen_clauses.insert(id.clone()) {
                        Admission::Keep { toc: true }
                    } else {
                        self.removed += 1;
                        Admission::Drop {
                            swallow_blank: true,
                        }
                    }
                }
                (kind, _) => Admission::Keep {
                    toc: kind == HeadingKind::MajorSection,
                },
            },
        }
    }
}

#[cfg(test)]
#[path = "tests/dedup.rs"]
mod tests;
