//! Integration tests for manifest building

use crate::integration::test_utils::{docs_fixture, write_tree};
use docnav::error::BuildError;
use docnav::manifest::codec::to_json_string;
use docnav::manifest::node::keys;
use docnav::manifest::{MetadataValue, NodeKind};
use docnav::tree::builder::{BuildOptions, ManifestBuilder, WarningKind};
use docnav::tree::filter::ExtensionFilter;
use docnav::tree::hasher::compute_node_id;
use std::fs;
use tempfile::TempDir;

fn child_names(manifest: &docnav::manifest::Manifest, path: &str) -> Vec<String> {
    let id = manifest.get_by_path(path).unwrap().id;
    manifest.children(&id).map(|n| n.name.clone()).collect()
}

#[test]
fn test_fixture_tree_shape_and_order() {
    let temp = docs_fixture();
    let out = ManifestBuilder::new(temp.path().to_path_buf()).build().unwrap();
    let manifest = out.manifest;

    assert!(out.warnings.is_empty());
    // root, guide, guide/advanced, 4 documents; image.png filtered out
    assert_eq!(manifest.len(), 7);
    assert_eq!(manifest.document_count(), 4);
    assert!(manifest.get_by_path("image.png").is_none());

    assert_eq!(child_names(&manifest, ""), vec!["guide", "notes.txt", "README.md"]);
    assert_eq!(child_names(&manifest, "guide"), vec!["advanced", "intro.md"]);

    for (i, child) in manifest.children(&manifest.root_id()).enumerate() {
        assert_eq!(child.order, i as u32);
    }
}

#[test]
fn test_document_metadata() {
    let temp = docs_fixture();
    let manifest = ManifestBuilder::new(temp.path().to_path_buf())
        .build()
        .unwrap()
        .manifest;

    let intro = manifest.get_by_path("guide/intro.md").unwrap();
    assert_eq!(intro.kind, NodeKind::Document);
    assert_eq!(intro.title(), "Introduction");
    assert_eq!(intro.metadata[keys::SIZE], MetadataValue::Integer(28));
    assert_eq!(intro.fingerprint().as_str().len(), 64);
    assert!(!intro.metadata.contains_key(keys::MODIFIED));

    let tuning = manifest.get_by_path("guide/advanced/tuning.md").unwrap();
    assert_eq!(tuning.title(), "Tuning");

    let notes = manifest.get_by_path("notes.txt").unwrap();
    assert!(!notes.metadata.contains_key(keys::TITLE));
    assert_eq!(notes.title(), "notes.txt");

    let guide = manifest.get_by_path("guide").unwrap();
    assert_eq!(guide.metadata[keys::DOCUMENTS], MetadataValue::Integer(2));
    assert_eq!(manifest.root().metadata[keys::DOCUMENTS], MetadataValue::Integer(4));
}

#[test]
fn test_rebuild_is_byte_identical() {
    let temp = docs_fixture();
    let builder = ManifestBuilder::new(temp.path().to_path_buf());
    let first = to_json_string(&builder.build().unwrap().manifest).unwrap();
    let second = to_json_string(&builder.build().unwrap().manifest).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_ids_survive_content_change() {
    let temp = docs_fixture();
    let builder = ManifestBuilder::new(temp.path().to_path_buf());
    let before = builder.build().unwrap().manifest;

    fs::write(temp.path().join("guide").join("intro.md"), "# Introduction\n\nRewritten.\n").unwrap();
    let after = builder.build().unwrap().manifest;

    let id = compute_node_id("guide/intro.md");
    assert_eq!(before.get(&id).unwrap().path, after.get(&id).unwrap().path);
    assert_ne!(
        before.get(&id).unwrap().fingerprint(),
        after.get(&id).unwrap().fingerprint()
    );
    assert_eq!(
        before.get(&compute_node_id("README.md")).unwrap().fingerprint(),
        after.get(&compute_node_id("README.md")).unwrap().fingerprint()
    );
}

#[test]
fn test_empty_directory_is_kept() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("empty/", ""), ("only-images/pic.png", "x"), ("a.md", "a")]);

    let manifest = ManifestBuilder::new(temp.path().to_path_buf())
        .build()
        .unwrap()
        .manifest;

    let empty = manifest.get_by_path("empty").unwrap();
    assert_eq!(empty.kind, NodeKind::Directory);
    assert!(empty.child_ids().is_empty());
    assert_eq!(empty.metadata[keys::DOCUMENTS], MetadataValue::Integer(0));

    let filtered = manifest.get_by_path("only-images").unwrap();
    assert!(filtered.child_ids().is_empty());

    let json = to_json_string(&manifest).unwrap();
    assert!(json.contains("\"children\": []"));
}

#[test]
fn test_prune_empty_dirs() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("empty/", ""), ("nested/deeper/", ""), ("z.md", "z")]);

    let manifest = ManifestBuilder::new(temp.path().to_path_buf())
        .with_options(BuildOptions {
            prune_empty_dirs: true,
            ..Default::default()
        })
        .build()
        .unwrap()
        .manifest;

    assert_eq!(manifest.len(), 2);
    assert!(manifest.get_by_path("empty").is_none());
    assert!(manifest.get_by_path("nested/deeper").is_none());
    assert_eq!(manifest.get_by_path("z.md").unwrap().order, 0);
}

#[test]
fn test_custom_filter_and_ignore_patterns() {
    let temp = docs_fixture();
    write_tree(temp.path(), &[("drafts/wip.md", "wip"), ("guide/skip.md", "skip")]);

    let filter = ExtensionFilter::new(["md"]).with_ignore_patterns(["drafts", "guide/skip.md"]);
    let manifest = ManifestBuilder::new(temp.path().to_path_buf())
        .with_filter(filter)
        .build()
        .unwrap()
        .manifest;

    assert!(manifest.get_by_path("drafts").is_none());
    assert!(manifest.get_by_path("guide/skip.md").is_none());
    assert!(manifest.get_by_path("notes.txt").is_none());
    assert!(manifest.get_by_path("README.md").is_some());
}

#[test]
fn test_hidden_entries_skipped_by_default() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[(".hidden/secret.md", "s"), (".draft.md", "d"), ("a.md", "a")]);

    let manifest = ManifestBuilder::new(temp.path().to_path_buf())
        .build()
        .unwrap()
        .manifest;
    assert_eq!(manifest.len(), 2);

    let manifest = ManifestBuilder::new(temp.path().to_path_buf())
        .with_filter(ExtensionFilter::default().with_hidden(true))
        .build()
        .unwrap()
        .manifest;
    assert!(manifest.get_by_path(".hidden/secret.md").is_some());
    assert!(manifest.get_by_path(".draft.md").is_some());
}

#[test]
fn test_missing_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let result = ManifestBuilder::new(temp.path().join("missing")).build();
    assert!(matches!(result, Err(BuildError::RootNotFound(_))));
}

#[test]
fn test_file_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file.md");
    fs::write(&file, "x").unwrap();
    let result = ManifestBuilder::new(file).build();
    assert!(matches!(result, Err(BuildError::RootNotFound(_))));
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_warns_once_and_terminates() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("a/b/doc.md", "doc")]);
    std::os::unix::fs::symlink(temp.path().join("a"), temp.path().join("a/b/loop")).unwrap();

    let out = ManifestBuilder::new(temp.path().to_path_buf()).build().unwrap();
    let cycles: Vec<_> = out
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::SymlinkCycle)
        .collect();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].path, "a/b/loop");
    assert!(out.manifest.get_by_path("a/b/loop").is_none());
    assert!(out.manifest.get_by_path("a/b/doc.md").is_some());
}

#[cfg(unix)]
#[test]
fn test_symlink_outside_root_is_omitted() {
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret.md"), "secret").unwrap();

    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("a.md", "a")]);
    std::os::unix::fs::symlink(outside.path().join("secret.md"), temp.path().join("leak.md")).unwrap();
    std::os::unix::fs::symlink(temp.path().join("missing.md"), temp.path().join("broken.md")).unwrap();

    let out = ManifestBuilder::new(temp.path().to_path_buf()).build().unwrap();
    let kinds: Vec<_> = out.warnings.iter().map(|w| (w.kind, w.path.as_str())).collect();
    assert!(kinds.contains(&(WarningKind::SymlinkEscapesRoot, "leak.md")));
    assert!(kinds.contains(&(WarningKind::BrokenSymlink, "broken.md")));
    assert_eq!(out.manifest.document_count(), 1);
}

#[cfg(unix)]
#[test]
fn test_symlink_inside_root_is_followed() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("real/doc.md", "doc")]);
    std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("alias")).unwrap();

    let out = ManifestBuilder::new(temp.path().to_path_buf()).build().unwrap();
    assert!(out.warnings.is_empty());
    assert!(out.manifest.get_by_path("alias/doc.md").is_some());
    assert!(out.manifest.get_by_path("real/doc.md").is_some());
}

#[cfg(target_os = "linux")]
#[test]
fn test_unicode_equivalent_siblings_keep_one() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("caf\u{e9}.md"), "composed").unwrap();
    fs::write(temp.path().join("cafe\u{0301}.md"), "decomposed").unwrap();
    fs::write(temp.path().join("other.md"), "other").unwrap();

    let out = ManifestBuilder::new(temp.path().to_path_buf()).build().unwrap();
    let manifest = out.manifest;

    assert_eq!(manifest.document_count(), 2);
    assert_eq!(child_names(&manifest, ""), vec!["caf\u{e9}.md", "other.md"]);
    // The decomposed spelling sorts first by raw bytes and wins.
    let kept = manifest.get_by_path("caf\u{e9}.md").unwrap();
    assert_eq!(kept.source_path(), "cafe\u{0301}.md");

    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::NameCollision);
    assert_eq!(out.warnings[0].path, "caf\u{e9}.md");
}

#[cfg(unix)]
#[test]
fn test_backslash_name_is_a_single_segment() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("a/b.md", "nested"), ("a\\b.md", "flat")]);

    let out = ManifestBuilder::new(temp.path().to_path_buf()).build().unwrap();
    assert!(out.warnings.is_empty());

    let manifest = out.manifest;
    assert_eq!(manifest.get_by_path("a/b.md").unwrap().kind, NodeKind::Document);
    let flat = manifest.get_by_path("a\\b.md").unwrap();
    assert_eq!(flat.name, "a\\b.md");
    assert_eq!(manifest.parent(&flat.id), Some(manifest.root_id()));
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_name_is_skipped_with_warning() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(OsStr::from_bytes(b"bad\xFF.md")), "x").unwrap();
    fs::write(temp.path().join("good.md"), "good").unwrap();

    let out = ManifestBuilder::new(temp.path().to_path_buf()).build().unwrap();
    assert_eq!(out.manifest.document_count(), 1);
    assert!(out.manifest.get_by_path("good.md").is_some());
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::InvalidName);
    assert!(out.warnings[0].path.starts_with("bad"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped_with_warning() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("locked/secret.md", "s"), ("open/a.md", "a"), ("z.md", "z")]);
    let locked = temp.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not apply to a privileged user.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = ManifestBuilder::new(temp.path().to_path_buf()).build();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let out = result.unwrap();

    assert!(out.manifest.get_by_path("locked").is_none());
    assert!(out.manifest.get_by_path("open/a.md").is_some());
    assert!(out.manifest.get_by_path("z.md").is_some());
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::Unreadable);
    assert_eq!(out.warnings[0].path, "locked");
}
