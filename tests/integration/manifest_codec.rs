//! Integration tests for the manifest artifact

use crate::integration::test_utils::docs_fixture;
use docnav::error::ManifestError;
use docnav::manifest::codec::{from_json_str, read_manifest, to_json_string, write_manifest};
use docnav::manifest::SCHEMA_VERSION;
use docnav::tree::builder::ManifestBuilder;
use serde_json::Value;
use tempfile::TempDir;

fn built_json() -> (TempDir, String) {
    let temp = docs_fixture();
    let manifest = ManifestBuilder::new(temp.path().to_path_buf())
        .build()
        .unwrap()
        .manifest;
    let json = to_json_string(&manifest).unwrap();
    (temp, json)
}

#[test]
fn test_artifact_layout() {
    let (_temp, json) = built_json();
    let value: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["schema_version"], SCHEMA_VERSION);
    let nodes = value["nodes"].as_array().unwrap();
    assert_eq!(nodes[0]["id"], value["root"]);
    assert_eq!(nodes[0]["path"], "");

    // Pre-order: guide, then its subtree, before the root's later children.
    let paths: Vec<&str> = nodes.iter().map(|n| n["path"].as_str().unwrap()).collect();
    assert_eq!(
        paths,
        vec![
            "",
            "guide",
            "guide/advanced",
            "guide/advanced/tuning.md",
            "guide/intro.md",
            "notes.txt",
            "README.md"
        ]
    );

    let readme = &nodes[6];
    assert_eq!(readme["kind"], "document");
    assert!(readme.get("children").is_none());
    assert_eq!(readme["metadata"]["title"], "Read me");
}

#[test]
fn test_round_trip_through_file() {
    let temp = docs_fixture();
    let manifest = ManifestBuilder::new(temp.path().to_path_buf())
        .build()
        .unwrap()
        .manifest;

    let out_dir = TempDir::new().unwrap();
    let path = out_dir.path().join("nested").join("manifest.json");
    write_manifest(&manifest, &path).unwrap();

    let read = read_manifest(&path).unwrap();
    assert_eq!(read, manifest);
    assert!(!out_dir.path().join("nested").join(".manifest.json.tmp").exists());
}

#[test]
fn test_unsupported_schema_version() {
    let (_temp, json) = built_json();
    let mut value: Value = serde_json::from_str(&json).unwrap();
    value["schema_version"] = Value::from(2);
    // Other fields being garbage must not matter once the version mismatches.
    value["nodes"] = Value::from("not a list");

    let err = from_json_str(&value.to_string()).unwrap_err();
    assert!(matches!(
        err,
        ManifestError::UnsupportedSchemaVersion {
            found: 2,
            supported: 1
        }
    ));
}

#[test]
fn test_malformed_inputs() {
    assert!(matches!(from_json_str("{"), Err(ManifestError::Malformed(_))));
    assert!(matches!(
        from_json_str(r#"{"root": "00", "nodes": []}"#),
        Err(ManifestError::Malformed(_))
    ));

    let (_temp, json) = built_json();
    let mut value: Value = serde_json::from_str(&json).unwrap();
    value["nodes"][6]["metadata"]["title"] = serde_json::json!({"nested": true});
    assert!(matches!(
        from_json_str(&value.to_string()),
        Err(ManifestError::Malformed(_))
    ));
}

#[test]
fn test_orphan_node_is_inconsistent() {
    let (_temp, json) = built_json();
    let mut value: Value = serde_json::from_str(&json).unwrap();

    // Detach README.md from the root's children; the node itself stays.
    let readme_id = value["nodes"][6]["id"].clone();
    let root_children = value["nodes"][0]["children"].as_array_mut().unwrap();
    root_children.retain(|c| *c != readme_id);

    assert!(matches!(
        from_json_str(&value.to_string()),
        Err(ManifestError::Inconsistent(_))
    ));
}

#[test]
fn test_dangling_child_is_inconsistent() {
    let (_temp, json) = built_json();
    let mut value: Value = serde_json::from_str(&json).unwrap();
    value["nodes"].as_array_mut().unwrap().remove(6);

    assert!(matches!(
        from_json_str(&value.to_string()),
        Err(ManifestError::Inconsistent(_))
    ));
}

#[test]
fn test_read_missing_file() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(
        read_manifest(&temp.path().join("none.json")),
        Err(ManifestError::Io(_))
    ));
}
