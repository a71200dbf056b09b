use super::{RenumberRule, SectionNumberMap};
use crate::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

fn rule(category: &str, old: &str, new: &str, heading_shift: i8) -> RenumberRule {
    RenumberRule {
        category: category.to_string(),
        old: old.to_string(),
        new: new.to_string(),
        heading_shift,
        title_shift: 0,
    }
}

#[test]
fn test_heading_renumbered_and_shifted() {
    let map = SectionNumberMap::legacy_type_system();
    let result = map.renumber("tuples", "### 7.2 Layout\n\nBody.\n");
    assert_eq!(result.text, "#### 2.2.1.2 Layout\n\nBody.\n");
    assert_eq!(result.headings, 1);
    assert_eq!(result.total(), 1);
}

#[test]
fn test_heading_keeps_section_sign_and_drops_trailing_dot() {
    let map = SectionNumberMap::legacy_type_system();
    assert_eq!(
        map.renumber("tuples", "### §7.2 Layout").text,
        "#### §2.2.1.2 Layout"
    );
    assert_eq!(map.renumber("records", "## 8. Records").text, "## 2.2.2 Records");
}

#[test]
fn test_chapter_heading_keeps_its_level() {
    let map = SectionNumberMap::legacy_type_system();
    let result = map.renumber("tuples", "## 7. Tuples\n\n### 7.1 Syntax\n");
    assert_eq!(result.text, "## 2.2.1 Tuples\n\n#### 2.2.1.1 Syntax\n");
    assert_eq!(result.headings, 2);

    assert_eq!(
        map.renumber("integers", "## 5.1 Integer Types\n### 5.1.2 Ranges").text,
        "## 2.1.1 Integer Types\n##### 2.1.1.2 Ranges"
    );
}

#[test]
fn test_promoted_section_moves_with_its_subsections() {
    let map = SectionNumberMap::legacy_type_system();
    assert_eq!(
        map.renumber("records", "### 8.8 Tuple Structs\n#### 8.8.1 Syntax").text,
        "## 2.2.3 Tuple Structs\n### 2.2.3.1 Syntax"
    );
}

#[test]
fn test_indented_heading_renumbered() {
    let map = SectionNumberMap::legacy_type_system();
    assert_eq!(
        map.renumber("tuples", "  ### 7.2 Layout").text,
        "  #### 2.2.1.2 Layout"
    );
}

#[test]
fn test_heading_level_is_clamped() {
    let map = SectionNumberMap::legacy_type_system();
    assert_eq!(
        map.renumber("records", "# 8.8 Record Methods").text,
        "# 2.2.3 Record Methods"
    );
}

#[test]
fn test_references_markers_and_labels() {
    let map = SectionNumberMap::legacy_type_system();
    let text = "**Section**: §7\n\nSee (§7.3) and Definition 7.1.\n";
    let result = map.renumber("tuples", text);
    assert_eq!(
        result.text,
        "**Section**: §2.2.1\n\nSee (§2.2.1.3) and Definition 2.2.1.1.\n"
    );
    assert_eq!(result.markers, 1);
    assert_eq!(result.references, 1);
    assert_eq!(result.labels, 1);
}

#[test]
fn test_most_specific_prefix_wins() {
    let map = SectionNumberMap::legacy_type_system();
    let result = map.renumber("records", "(§8.2) and (§8.5) and (§8.5.1)");
    assert_eq!(result.text, "(§2.2.2.2) and (§2.3.2) and (§2.3.2.1)");
}

#[test]
fn test_scoped_by_category() {
    let map = SectionNumberMap::legacy_type_system();
    assert_eq!(map.lookup("arrays-and-slices", "6.1").as_deref(), Some("2.4.1"));
    assert_eq!(map.lookup("traits", "6.1").as_deref(), Some("2.6.1"));
    assert_eq!(map.lookup("unions", "8.5").as_deref(), Some("2.3.2"));
    // Unions own only §8.5; plain records numbers are not theirs to rewrite.
    assert_eq!(map.lookup("unions", "8.2"), None);
    assert_eq!(map.renumber("unions", "(§8.2)").text, "(§8.2)");
}

#[test]
fn test_unknown_category_untouched() {
    let map = SectionNumberMap::legacy_type_system();
    let text = "### 7.2 Layout\n(§7.2)\n";
    let result = map.renumber("lexical-structure", text);
    assert_eq!(result.text, text);
    assert_eq!(result.total(), 0);
}

#[test]
fn test_second_pass_changes_nothing() {
    let map = SectionNumberMap::legacy_type_system();
    let once = map.renumber("tuples", "### 7.2 Layout\nSee (§7.3).\n");
    let twice = map.renumber("tuples", &once.text);
    assert_eq!(twice.text, once.text);
    assert_eq!(twice.total(), 0);
}

#[test]
fn test_category_names_normalised() {
    let map = SectionNumberMap::legacy_type_system();
    assert!(map.has_category("ArraysAndSlices"));
    assert!(map.has_category("self-type"));
    assert!(!map.has_category("lexical"));
    assert_eq!(map.lookup("SelfType", "12").as_deref(), Some("2.10"));
}

#[test]
fn test_ambiguous_rules_rejected() {
    let err = SectionNumberMap::new(vec![
        rule("arrays", "6", "2.4", 0),
        rule("arrays", "6", "2.6", 0),
    ])
    .unwrap_err();
    assert!(matches!(err, Error::AmbiguousMapping { ref old, .. } if old == "6"));
}

#[test]
fn test_same_old_number_in_different_categories() {
    let map = SectionNumberMap::new(vec![
        rule("arrays", "6", "2.4", 0),
        rule("traits", "6", "2.6", 0),
        rule("traits", "6", "2.6", 0),
    ])
    .unwrap();
    assert_eq!(map.categories().collect::<Vec<_>>(), vec!["arrays", "traits"]);
    assert_eq!(map.lookup("traits", "6").as_deref(), Some("2.6"));
}

#[test]
fn test_invalid_number_rejected() {
    let err = SectionNumberMap::new(vec![rule("arrays", "six", "2.4", 0)]).unwrap_err();
    assert!(matches!(err, Error::InvalidSectionNumber(ref n) if n == "six"));
}

#[test]
fn test_from_json() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"rules": [
            {{"category": "Tuples", "old": "7", "new": "2.2.1", "heading_shift": 1}},
            {{"category": "Records", "old": "8.8", "new": "2.2.3", "title_shift": -1, "heading_shift": -1}},
            {{"category": "enums", "old": "§9", "new": "2.3.1"}}
        ]}}"#
    )
    .unwrap();

    let map = SectionNumberMap::from_json(file.path()).unwrap();
    assert!(!map.is_empty());
    assert_eq!(map.lookup("tuples", "7.4").as_deref(), Some("2.2.1.4"));
    assert_eq!(map.renumber("enums", "### 9.1 Variants").text, "### 2.3.1.1 Variants");
    assert_eq!(map.renumber("tuples", "## 7 Tuples").text, "## 2.2.1 Tuples");
    assert_eq!(
        map.renumber("records", "### 8.8 Tuple Structs").text,
        "## 2.2.3 Tuple Structs"
    );
}

#[test]
fn test_from_json_malformed() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    assert!(matches!(
        SectionNumberMap::from_json(file.path()),
        Err(Error::MapFormat { .. })
    ));
}

#[test]
fn test_prefix_matches_whole_components() {
    let map = SectionNumberMap::legacy_type_system();
    assert_eq!(map.lookup("records", "8"), Some("2.2.2".to_string()));
    assert_eq!(map.lookup("records", "80.1"), None);
    assert_eq!(map.renumber("records", "(§80.1)").text, "(§80.1)");
}

#[test]
fn test_empty_map_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"rules": []}}"#).unwrap();
    let map = SectionNumberMap::from_json(file.path()).unwrap();
    assert!(map.is_empty());
    assert_eq!(map.categories().count(), 0);
}
