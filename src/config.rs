//! Configuration to acknowledge project layout preferences as well as set defaults.
//!
//! Specifically, we try to find a colophon.toml, and if present we load settings from there.
//! This provides the document title, the output file name, which directories and files make up
//! the specification, and the heuristics used while cleaning fragments.

use facet::Facet;
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "colophon.toml";

/// Number of trailing lines searched for a navigation footer.
pub const DEFAULT_FOOTER_WINDOW: usize = 10;

fn default_title() -> String {
    "Specification".to_string()
}

fn default_output() -> String {
    "Specification-Complete.md".to_string()
}

fn default_annex_dir() -> String {
    "Annex".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec!["SpecificationGuide.md".to_string()]
}

fn default_exclude_prefixes() -> Vec<String> {
    vec!["VALIDATION-".to_string()]
}

fn default_dedup() -> String {
    "exact-line".to_string()
}

#[derive(Facet, Clone, Debug)]
/// Project preferences loaded from colophon.toml or falling back to defaults.
pub struct Config {
    #[facet(default = default_title())]
    /// Title emitted once at the top of the compiled document.
    pub title: String,
    #[facet(default = default_output())]
    /// File name of the compiled document, relative to the specification root.
    pub output: String,
    #[facet(default = default_annex_dir())]
    /// Reserved directory whose lettered files sort after every numbered category.
    pub annex_dir: String,
    #[facet(default = Vec::new())]
    /// Category directories expected under the root; empty means discover `NN_*` directories.
    pub categories: Vec<String>,
    #[facet(default = default_extensions())]
    /// File suffixes treated as fragments.
    pub file_extensions: Vec<String>,
    #[facet(default = default_exclude())]
    /// Exact file names that are never fragments.
    pub exclude: Vec<String>,
    #[facet(default = default_exclude_prefixes())]
    /// File name prefixes that are never fragments.
    pub exclude_prefixes: Vec<String>,
    #[facet(default = DEFAULT_FOOTER_WINDOW)]
    /// How many trailing lines are searched for a Previous/Next footer.
    pub footer_window: usize,
    #[facet(default = default_dedup())]
    /// Heading deduplication policy: `exact-line` or `clause`.
    pub dedup: String,
    #[facet(default = Vec::new())]
    /// Heading lines removed wherever they appear in a fragment, besides the title itself.
    pub drop_headings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: default_title(),
            output: default_output(),
            annex_dir: default_annex_dir(),
            categories: Vec::new(),
            file_extensions: default_extensions(),
            exclude: default_exclude(),
            exclude_prefixes: default_exclude_prefixes(),
            footer_window: DEFAULT_FOOTER_WINDOW,
            dedup: default_dedup(),
            drop_headings: Vec::new(),
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from colophon.toml in the working directory if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from an explicit path, falling back to defaults.
    ///
    /// A file that exists but does not parse is reported and ignored rather than aborting the
    /// run, since every setting has a usable default.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Self::default();
        };
        Self::from_toml(&contents).unwrap_or_else(|| {
            tracing::warn!(path = %path.display(), "ignoring unparseable configuration file");
            Self::default()
        })
    }

    #[must_use]
    /// Parse configuration from TOML text, filling unspecified fields with defaults.
    pub fn from_toml(contents: &str) -> Option<Self> {
        facet_toml::from_str::<Self>(contents).ok()
    }

    #[must_use]
    /// Whether a file name should be skipped during fragment discovery.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        file_name == self.output
            || self.exclude.iter().any(|name| name == file_name)
            || self
                .exclude_prefixes
                .iter()
                .any(|prefix| file_name.starts_with(prefix.as_str()))
    }

    #[must_use]
    /// Whether a file extension marks a fragment.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|ext| self.file_extensions.iter().any(|e| e == ext))
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
