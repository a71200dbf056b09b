use super::{Assembler, Warning};
use crate::config::Config;
use crate::dedup::DedupPolicy;
use crate::error::Error;
use crate::renumber::SectionNumberMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCOPE: &str = "# Scope

## Clause 1 — Introduction

**Section**: §1.1

---

### §1.1 Scope

[1] This document specifies the language.

```sh
# not a heading
```

---

**Previous**: (none) | **Next**: [§1.2 Terms](01-2_Terms.md)
";

const TERMS: &str = "# Terms

## Clause 1 — Introduction

**Section**: §1.2

---

### §1.2 Terms and Definitions

[1] Terms used throughout.

#### §1.2.1 Identifier

[2] An identifier names an entity.

---

**Previous**: [§1.1 Scope](01-1_Scope.md) | **Next**: (none)
";

const GRAMMAR: &str = "## Annex A — Grammar

### A.1 Lexical Grammar

Productions.
";

fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "01_Introduction/01-2_Terms.md", TERMS);
    write(root, "01_Introduction/01-1_Scope.md", SCOPE);
    write(root, "Annex/A_Grammar.md", GRAMMAR);
    dir
}

#[test]
fn test_discover_orders_and_filters() {
    let dir = fixture();
    let root = dir.path();
    write(root, "01_Introduction/VALIDATION-report.md", "ignored");
    write(root, "01_Introduction/notes.txt", "ignored");
    write(root, "SpecificationGuide.md", "ignored");
    write(root, "Drafts/01-1_Old.md", "ignored");

    let config = Config::default();
    let discovery = Assembler::new(&config).discover(root).unwrap();
    let order: Vec<PathBuf> = discovery
        .fragments
        .iter()
        .map(|f| f.relative.clone())
        .collect();
    assert_eq!(
        order,
        vec![
            PathBuf::from("01_Introduction/01-1_Scope.md"),
            PathBuf::from("01_Introduction/01-2_Terms.md"),
            PathBuf::from("Annex/A_Grammar.md"),
        ]
    );
    assert!(discovery.warnings.is_empty());
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();
    let result = Assembler::new(&config).compile(&dir.path().join("absent"));
    assert!(matches!(result, Err(Error::MissingRoot(_))));
}

#[test]
fn test_missing_categories_are_warnings() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "01_Introduction/01-1_Scope.md", SCOPE);

    let config = Config {
        categories: vec!["01_Introduction".to_string(), "02_Types".to_string()],
        ..Config::default()
    };
    let document = Assembler::new(&config).compile(root).unwrap();

    assert_eq!(document.report.fragments_processed, 1);
    assert_eq!(
        document.report.warnings,
        vec![
            Warning::MissingCategoryDirectory {
                path: root.join("02_Types")
            },
            Warning::MissingCategoryDirectory {
                path: root.join("Annex")
            },
        ]
    );
}

#[test]
fn test_compile_document() {
    let dir = fixture();
    let config = Config::default();
    let document = Assembler::new(&config).compile(dir.path()).unwrap();
    let text = document.render();

    assert!(text.starts_with("# Specification\n\n# Table of Contents\n\n"));
    assert_eq!(text.matches("## Clause 1 — Introduction").count(), 1);
    assert!(!text.contains("**Previous**"));
    assert!(!text.contains("**Section**"));
    assert!(!text.contains("[1] "));
    assert!(!text.contains("# Scope\n"));
    assert!(text.contains("This document specifies the language."));
    assert!(text.contains("```sh\n# not a heading\n```"));

    let scope = text.find("### §1.1 Scope").unwrap();
    let terms = text.find("### §1.2 Terms and Definitions").unwrap();
    let annex = text.find("## Annex A — Grammar").unwrap();
    assert!(scope < terms && terms < annex);

    let toc: Vec<(usize, &str)> = document
        .toc
        .iter()
        .map(|e| (e.depth, e.text.as_str()))
        .collect();
    assert_eq!(
        toc,
        vec![
            (1, "Clause 1 — Introduction"),
            (2, "§1.1 Scope"),
            (2, "§1.2 Terms and Definitions"),
            (1, "Annex A — Grammar"),
        ]
    );

    let report = &document.report;
    assert_eq!(report.fragments_discovered, 3);
    assert_eq!(report.fragments_processed, 3);
    assert_eq!(report.fragments_skipped, 0);
    assert_eq!(report.duplicate_headings_removed, 1);
    assert_eq!(report.toc_entries, 4);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_vanished_fragment_is_skipped() {
    let dir = fixture();
    let root = dir.path();
    let config = Config::default();
    let assembler = Assembler::new(&config);

    let discovery = assembler.discover(root).unwrap();
    let vanished = root.join("01_Introduction/01-1_Scope.md");
    fs::remove_file(&vanished).unwrap();

    let document = assembler
        .compile_fragments(&discovery.fragments, discovery.warnings)
        .unwrap();

    assert_eq!(document.report.fragments_processed, 2);
    assert_eq!(document.report.fragments_skipped, 1);
    assert_eq!(
        document.report.warnings,
        vec![Warning::MissingFragmentFile { path: vanished }]
    );

    // The chapter heading now comes from the next fragment.
    assert_eq!(document.toc[0].text, "Clause 1 — Introduction");
    assert_eq!(document.toc.len(), 3);
    let text = document.render();
    assert!(!text.contains("§1.1 Scope"));
    assert!(text.find("§1.2 Terms").unwrap() < text.find("Annex A").unwrap());
}

#[test]
fn test_invalid_utf8_is_skipped() {
    let dir = fixture();
    let root = dir.path();
    fs::write(root.join("01_Introduction/01-3_Broken.md"), [0xff, 0xfe, 0x00]).unwrap();

    let config = Config::default();
    let document = Assembler::new(&config).compile(root).unwrap();
    assert_eq!(document.report.fragments_processed, 3);
    assert_eq!(document.report.fragments_skipped, 1);
    assert!(matches!(
        document.report.warnings.as_slice(),
        [Warning::FragmentProcessingFailure { .. }]
    ));
}

#[test]
fn test_clause_policy_collapses_variants() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "02_Types/02-1_Integers.md", "## Clause 2 — Types\n\n### §2.1 Integers\n");
    write(root, "02_Types/02-2_Tuples.md", "## Clause 2 - Types\n\n### §2.2 Tuples\n");

    let config = Config::default();

    let exact = Assembler::new(&config).compile(root).unwrap();
    assert!(exact.render().contains("## Clause 2 - Types"));
    assert_eq!(exact.toc.len(), 3);

    let clause = Assembler::new(&config)
        .with_policy(DedupPolicy::ClauseIdentifier)
        .compile(root)
        .unwrap();
    let text = clause.render();
    assert!(!text.contains("## Clause 2 - Types"));
    assert!(text.contains("### §2.2 Tuples"));
    assert_eq!(clause.toc.len(), 3);
    assert_eq!(clause.report.duplicate_headings_removed, 1);
}

#[test]
fn test_title_and_dropped_headings_removed() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "01_Introduction/01-1_Scope.md",
        "Preamble.\n\n# Specification\n\n## Status\n\nBody.\n",
    );

    let config = Config {
        drop_headings: vec!["## Status".to_string()],
        ..Config::default()
    };
    let document = Assembler::new(&config).compile(root).unwrap();
    assert_eq!(document.bodies, vec!["Preamble.\n\nBody.".to_string()]);
    assert_eq!(document.render().matches("# Specification\n").count(), 1);
}

#[test]
fn test_renumbering_during_compile() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "02_Types/02-2_Tuples.md",
        "## Clause 2 — Types\n\n## 7. Tuples\n\n### 7.1 Layout\n\nSee (§7.1).\n",
    );

    let config = Config::default();
    let map = SectionNumberMap::legacy_type_system();
    let document = Assembler::new(&config)
        .with_renumbering(&map)
        .compile(root)
        .unwrap();

    let text = document.render();
    assert!(text.contains("## 2.2.1 Tuples"));
    assert!(!text.contains("### 2.2.1 Tuples"));
    assert!(text.contains("#### 2.2.1.1 Layout"));
    assert!(text.contains("See (§2.2.1.1)."));
    assert_eq!(document.report.sections_renumbered, 3);
}

#[test]
fn test_write() {
    let dir = fixture();
    let config = Config::default();
    let document = Assembler::new(&config).compile(dir.path()).unwrap();

    let output = dir.path().join(&config.output);
    document.write(&output).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), document.render());

    // The written document is never picked up as a fragment on the next run.
    let again = Assembler::new(&config).compile(dir.path()).unwrap();
    assert_eq!(again.report.fragments_discovered, 3);
}

#[test]
fn test_write_failure() {
    let dir = fixture();
    let config = Config::default();
    let document = Assembler::new(&config).compile(dir.path()).unwrap();
    let result = document.write(&dir.path().join("missing/dir/out.md"));
    assert!(matches!(result, Err(Error::Write { .. })));
}
