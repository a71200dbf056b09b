//! Compilation of a fragment tree into one document.
//!
//! The assembler discovers fragments, puts them in reading order and runs each one through the
//! cleaning pipeline: renumbering (when a map is attached), navigation stripping, paragraph
//! number stripping and heading deduplication, collecting table of contents entries on the way.
//! Fragments are handled strictly one after another because the dedup state and the TOC depend
//! on encounter order.
//!
//! A fragment that cannot be read or parsed is reported and skipped; the run carries on with
//! the rest. Only failures of the environment (missing root, unwritable output) end a run.

use crate::config::Config;
use crate::dedup::{Admission, DedupPolicy, DedupState};
use crate::error::Error;
use crate::formats::markdown::MarkdownFormat;
use crate::fragment::Fragment;
use crate::heading::{classify, Heading, HeadingScanner};
use crate::order::{self, is_category_dir};
use crate::renumber::SectionNumberMap;
use crate::strip::{strip_navigation, strip_paragraph_numbers};
use crate::toc::{self, TocBuilder, TocEntry};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Non-fatal problem recorded during a run.
pub enum Warning {
    /// An expected category directory is absent; it contributes no fragments.
    MissingCategoryDirectory {
        /// Directory that was looked for.
        path: PathBuf,
    },
    /// A fragment vanished between discovery and reading.
    MissingFragmentFile {
        /// Fragment path.
        path: PathBuf,
    },
    /// A fragment could not be read or transformed and was left out.
    FragmentProcessingFailure {
        /// Fragment path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCategoryDirectory { path } => {
                write!(f, "category directory {} not found", path.display())
            }
            Self::MissingFragmentFile { path } => {
                write!(f, "fragment {} not found", path.display())
            }
            Self::FragmentProcessingFailure { path, reason } => {
                write!(f, "skipped {}: {reason}", path.display())
            }
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
/// Summary of a compilation run.
pub struct Report {
    /// Fragments found during discovery.
    pub fragments_discovered: usize,
    /// Fragments whose content reached the document.
    pub fragments_processed: usize,
    /// Fragments left out because of a warning.
    pub fragments_skipped: usize,
    /// Heading lines removed as duplicates.
    pub duplicate_headings_removed: usize,
    /// Section numbers rewritten by renumbering.
    pub sections_renumbered: usize,
    /// Entries in the table of contents.
    pub toc_entries: usize,
    /// Everything that went wrong without stopping the run.
    pub warnings: Vec<Warning>,
}

#[derive(Clone, Debug, Default)]
/// Fragments in reading order plus the warnings raised while finding them.
pub struct Discovery {
    /// Ordered fragments.
    pub fragments: Vec<Fragment>,
    /// Missing categories and the like.
    pub warnings: Vec<Warning>,
}

#[derive(Clone, Debug)]
/// The assembled specification, ready to be written once.
pub struct CompiledDocument {
    /// Document title, emitted as the only level-1 heading before the TOC.
    pub title: String,
    /// Table of contents entries in encounter order.
    pub toc: Vec<TocEntry>,
    /// Cleaned fragment bodies in reading order.
    pub bodies: Vec<String>,
    /// What happened during the run.
    pub report: Report,
}

impl CompiledDocument {
    #[must_use]
    /// Title, table of contents and bodies as one markdown string.
    pub fn render(&self) -> String {
        let mut out = format!("# {}\n\n", self.title);
        out.push_str(&toc::render(&self.toc));
        for body in &self.bodies {
            out.push_str(body);
            out.push_str("\n\n");
        }
        out
    }

    /// Write the rendered document to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written; there is no fallback location.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        fs::write(path, self.render()).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn record(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{warning}");
    warnings.push(warning);
}

fn read_error(path: &Path, source: io::Error) -> Error {
    Error::Read {
        path: path.to_path_buf(),
        source,
    }
}

/// Mutable state of one compilation run.
struct Session {
    scanner: HeadingScanner,
    dedup: DedupState,
    toc: TocBuilder,
    drop_lines: HashSet<String>,
}

/// Compiles a specification tree according to a [`Config`].
pub struct Assembler<'a> {
    config: &'a Config,
    policy: DedupPolicy,
    renumbering: Option<&'a SectionNumberMap>,
}

impl<'a> Assembler<'a> {
    #[must_use]
    /// Assembler using the dedup policy named in the configuration.
    pub fn new(config: &'a Config) -> Self {
        let policy = DedupPolicy::from_name(&config.dedup).unwrap_or_else(|| {
            tracing::warn!(dedup = %config.dedup, "unknown dedup policy, using exact-line");
            DedupPolicy::default()
        });
        Self {
            config,
            policy,
            renumbering: None,
        }
    }

    #[must_use]
    /// Override the dedup policy.
    pub fn with_policy(mut self, policy: DedupPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    /// Renumber each fragment with the rules of its category before cleaning it.
    pub fn with_renumbering(mut self, map: &'a SectionNumberMap) -> Self {
        self.renumbering = Some(map);
        self
    }

    /// Find all fragments under `root` and put them in reading order.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a directory or cannot be listed. Missing or unreadable
    /// category directories are warnings, not errors.
    pub fn discover(&self, root: &Path) -> Result<Discovery, Error> {
        if !root.is_dir() {
            return Err(Error::MissingRoot(root.to_path_buf()));
        }
        let mut warnings = Vec::new();
        let mut dirs = Vec::new();

        if self.config.categories.is_empty() {
            for entry in fs::read_dir(root).map_err(|e| read_error(root, e))? {
                let path = entry.map_err(|e| read_error(root, e))?.path();
                let numbered = path
                    .file_name()
                    .and_then(std::ffi::OsStr::to_str)
                    .is_some_and(is_category_dir);
                if numbered && path.is_dir() {
                    dirs.push(path);
                }
            }
            dirs.sort();
        } else {
            for name in &self.config.categories {
                let path = root.join(name);
                if path.is_dir() {
                    dirs.push(path);
                } else {
                    record(&mut warnings, Warning::MissingCategoryDirectory { path });
                }
            }
        }

        let annex = root.join(&self.config.annex_dir);
        if annex.is_dir() {
            dirs.push(annex);
        } else {
            record(&mut warnings, Warning::MissingCategoryDirectory { path: annex });
        }

        let mut fragments = Vec::new();
        for dir in dirs {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "cannot list category");
                    record(&mut warnings, Warning::MissingCategoryDirectory { path: dir });
                    continue;
                }
            };
            let before = fragments.len();
            for entry in entries.flatten() {
                let path = entry.path();
                let Some(name) = path.file_name().and_then(std::ffi::OsStr::to_str) else {
                    continue;
                };
                if path.is_file()
                    && self.config.matches_extension(&path)
                    && !self.config.is_excluded(name)
                {
                    fragments.push(Fragment::new(root, path));
                }
            }
            tracing::debug!(
                dir = %dir.display(),
                files = fragments.len() - before,
                "scanned category"
            );
        }

        order::resolve(&mut fragments, &self.config.annex_dir);
        tracing::info!(fragments = fragments.len(), "discovered specification fragments");
        Ok(Discovery {
            fragments,
            warnings,
        })
    }

    /// Discover and compile the specification under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the markdown grammar cannot be loaded.
    pub fn compile(&self, root: &Path) -> Result<CompiledDocument, Error> {
        let Discovery {
            fragments,
            warnings,
        } = self.discover(root)?;
        self.compile_fragments(&fragments, warnings)
    }

    /// Compile already ordered fragments, continuing past any that fail.
    ///
    /// `warnings` seeds the report, typically with those raised by discovery.
    ///
    /// # Errors
    ///
    /// Returns an error only if the markdown grammar cannot be loaded.
    pub fn compile_fragments(
        &self,
        fragments: &[Fragment],
        warnings: Vec<Warning>,
    ) -> Result<CompiledDocument, Error> {
        let mut session = Session {
            scanner: HeadingScanner::new(&MarkdownFormat)?,
            dedup: DedupState::new(self.policy),
            toc: TocBuilder::new(),
            drop_lines: self.drop_lines(),
        };
        let mut report = Report {
            fragments_discovered: fragments.len(),
            warnings,
            ..Report::default()
        };
        let mut bodies = Vec::new();

        for fragment in fragments {
            let _span =
                tracing::debug_span!("fragment", path = %fragment.relative.display()).entered();
            match self.process(&mut session, fragment, &mut report) {
                Ok(body) => {
                    report.fragments_processed += 1;
                    if !body.is_empty() {
                        bodies.push(body);
                    }
                }
                Err(warning) => {
                    report.fragments_skipped += 1;
                    record(&mut report.warnings, warning);
                }
            }
        }

        report.duplicate_headings_removed = session.dedup.removed();
        let toc = session.toc.into_entries();
        report.toc_entries = toc.len();

        tracing::info!(
            processed = report.fragments_processed,
            skipped = report.fragments_skipped,
            warnings = report.warnings.len(),
            duplicates_removed = report.duplicate_headings_removed,
            toc_entries = report.toc_entries,
            "compilation finished"
        );

        Ok(CompiledDocument {
            title: self.config.title.clone(),
            toc,
            bodies,
            report,
        })
    }

    fn drop_lines(&self) -> HashSet<String> {
        let mut lines: HashSet<String> = self
            .config
            .drop_headings
            .iter()
            .map(|l| l.trim().to_string())
            .collect();
        lines.insert(format!("# {}", self.config.title.trim()));
        lines
    }

    fn read(fragment: &Fragment) -> Result<String, Warning> {
        let bytes = fs::read(&fragment.path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Warning::MissingFragmentFile {
                    path: fragment.path.clone(),
                }
            } else {
                Warning::FragmentProcessingFailure {
                    path: fragment.path.clone(),
                    reason: e.to_string(),
                }
            }
        })?;
        String::from_utf8(bytes).map_err(|e| Warning::FragmentProcessingFailure {
            path: fragment.path.clone(),
            reason: format!("not valid UTF-8: {e}"),
        })
    }

    /// Clean one fragment into its body text.
    ///
    /// Every step that can fail runs before the session's dedup state or TOC is touched, so a
    /// skipped fragment leaves no trace in either.
    fn process(
        &self,
        session: &mut Session,
        fragment: &Fragment,
        report: &mut Report,
    ) -> Result<String, Warning> {
        let raw = Self::read(fragment)?;

        let mut renumbered = 0;
        let text = match self.renumbering {
            Some(map) if map.has_category(&fragment.category) => {
                let result = map.renumber(&fragment.category, &raw);
                renumbered = result.total();
                result.text
            }
            _ => raw,
        };
        let text = strip_navigation(&text, self.config.footer_window);
        let text = strip_paragraph_numbers(&text);

        let rows = session.scanner.heading_rows(&text).ok_or_else(|| {
            Warning::FragmentProcessingFailure {
                path: fragment.path.clone(),
                reason: "markdown parser produced no tree".to_string(),
            }
        })?;

        report.sections_renumbered += renumbered;
        let body = Self::filter_lines(session, &text, &rows);
        Ok(body.trim().to_string())
    }

    fn filter_lines(session: &mut Session, text: &str, rows: &HashSet<usize>) -> String {
        let mut kept: Vec<&str> = Vec::new();
        let mut swallow_blank = false;

        for (row, line) in text.split('\n').enumerate() {
            if std::mem::take(&mut swallow_blank) && line.trim().is_empty() {
                continue;
            }
            if session.drop_lines.contains(line.trim()) {
                swallow_blank = true;
                continue;
            }
            if let Some(heading) = Heading::parse(line).filter(|_| rows.contains(&row)) {
                let classified = classify(heading);
                match session.dedup.admit(line, &classified) {
                    Admission::Drop {
                        swallow_blank: swallow,
                    } => {
                        tracing::debug!(heading = line, "dropped duplicate heading");
                        swallow_blank = swallow;
                        continue;
                    }
                    Admission::Keep { toc: true } => session.toc.push(&classified),
                    Admission::Keep { toc: false } => {}
                }
            }
            kept.push(line);
        }

        kept.join("\n")
    }
}

#[cfg(test)]
#[path = "tests/assemble.rs"]
mod tests;
