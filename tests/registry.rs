mod common;

use common::*;
use hwpx_fill::{FieldMap, JsonTemplateRegistry, TemplateRegistry};
use tempfile::TempDir;

fn setup() -> (TempDir, JsonTemplateRegistry, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("application.hwpx");
    write_hwpx(&source, &[section_xml(&table_xml(&[&["Name", ""], &["Age", "30"]]))]);
    let registry = JsonTemplateRegistry::open(dir.path().join("templates")).unwrap();
    (dir, registry, source)
}

#[test]
fn open_creates_empty_index() {
    let (_dir, registry, _) = setup();
    assert!(registry.dir().join("index.json").exists());
    assert!(registry.list().unwrap().is_empty());
}

#[test]
fn save_copies_file_and_records_fields() {
    let (_dir, registry, source) = setup();
    let mapping: FieldMap = [("Name".to_string(), "applicant".to_string())].into();

    let stored = registry.save("application", &source, Some(&mapping)).unwrap();
    assert_eq!(stored, registry.dir().join("application.hwpx"));
    assert_eq!(std::fs::read(&stored).unwrap(), std::fs::read(&source).unwrap());

    let record = registry.get("application").unwrap().unwrap();
    assert_eq!(record.file, stored);
    assert_eq!(record.original_path, source);
    assert_eq!(record.extension, ".hwpx");
    assert_eq!(record.field_mapping, mapping);
    let names: Vec<&str> = record.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Name", "Age"]);
}

#[test]
fn index_is_plain_json() {
    let (_dir, registry, source) = setup();
    registry.save("신청서", &source, None).unwrap();

    let raw = std::fs::read_to_string(registry.dir().join("index.json")).unwrap();
    assert!(raw.contains("신청서"));
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["신청서"]["extension"], ".hwpx");
    assert_eq!(value["신청서"]["fields"][1]["content"], "30");
}

#[test]
fn unanalyzable_template_is_stored_without_fields() {
    let (dir, registry, _) = setup();
    let broken = dir.path().join("broken.hwpx");
    std::fs::write(&broken, b"not a zip").unwrap();

    registry.save("broken", &broken, None).unwrap();
    let record = registry.get("broken").unwrap().unwrap();
    assert!(record.fields.is_empty());
}

#[test]
fn list_delete_and_update_mapping() {
    let (_dir, registry, source) = setup();
    registry.save("b", &source, None).unwrap();
    registry.save("a", &source, None).unwrap();
    assert_eq!(registry.list().unwrap(), ["a", "b"]);

    let mapping: FieldMap = [("Age".to_string(), "age".to_string())].into();
    assert!(registry.update_mapping("a", &mapping).unwrap());
    assert!(!registry.update_mapping("missing", &mapping).unwrap());
    assert_eq!(registry.get("a").unwrap().unwrap().field_mapping, mapping);

    assert!(registry.delete("b").unwrap());
    assert!(!registry.delete("b").unwrap());
    assert!(!registry.dir().join("b.hwpx").exists());
    assert_eq!(registry.list().unwrap(), ["a"]);
    assert!(registry.get("b").unwrap().is_none());
}

#[test]
fn reopening_keeps_entries() {
    let (dir, registry, source) = setup();
    registry.save("kept", &source, None).unwrap();
    drop(registry);

    let reopened = JsonTemplateRegistry::open(dir.path().join("templates")).unwrap();
    assert_eq!(reopened.list().unwrap(), ["kept"]);
}

#[test]
fn resaving_the_stored_copy_keeps_it() {
    let (_dir, registry, source) = setup();
    let stored = registry.save("form", &source, None).unwrap();
    let size = std::fs::metadata(&stored).unwrap().len();

    let again = registry.save("form", &stored, None).unwrap();

    assert_eq!(again, stored);
    assert_eq!(std::fs::metadata(&stored).unwrap().len(), size);
    let record = registry.get("form").unwrap().unwrap();
    assert_eq!(record.fields.len(), 2);
}
