//! Property-based tests for determinism guarantees

use docnav::manifest::codec::to_json_string;
use docnav::tree::builder::ManifestBuilder;
use docnav::tree::hasher;
use docnav::tree::path::compare_names;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

fn file_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,8}\\.(md|txt)"
}

fn tree_entries() -> impl Strategy<Value = BTreeSet<(Option<String>, String)>> {
    prop::collection::btree_set(
        (prop::option::of("[a-z]{1,4}"), file_name()),
        0..12,
    )
}

fn materialize(entries: &BTreeSet<(Option<String>, String)>) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (dir, name) in entries {
        let parent = match dir {
            Some(dir) => temp.path().join(dir),
            None => temp.path().to_path_buf(),
        };
        fs::create_dir_all(&parent).unwrap();
        // A directory and a file may share a name; skip the clash.
        let target = parent.join(name);
        if !target.exists() {
            fs::write(target, name.as_bytes()).unwrap();
        }
    }
    temp
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Building the same tree twice yields byte-identical artifacts
    #[test]
    fn prop_build_is_byte_identical(entries in tree_entries()) {
        let temp = materialize(&entries);
        let builder = ManifestBuilder::new(temp.path().to_path_buf());
        let first = to_json_string(&builder.build().unwrap().manifest).unwrap();
        let second = to_json_string(&builder.build().unwrap().manifest).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Every built node is reachable and siblings are sorted
    #[test]
    fn prop_built_manifest_is_sorted_and_complete(entries in tree_entries()) {
        let temp = materialize(&entries);
        let manifest = ManifestBuilder::new(temp.path().to_path_buf()).build().unwrap().manifest;

        prop_assert_eq!(manifest.iter_preorder().len(), manifest.len());
        for node in manifest.nodes() {
            let names: Vec<&str> = manifest.children(&node.id).map(|c| c.name.as_str()).collect();
            for pair in names.windows(2) {
                prop_assert!(compare_names(pair[0], pair[1]).is_lt());
            }
        }
    }

    /// Node ids depend only on the path
    #[test]
    fn prop_node_id_is_a_function_of_path(a in "[a-z/]{0,16}", b in "[a-z/]{0,16}") {
        prop_assert_eq!(hasher::compute_node_id(&a) == hasher::compute_node_id(&b), a == b);
    }

    /// Sibling ordering is a total order independent of input order
    #[test]
    fn prop_compare_names_is_antisymmetric(a in "\\PC{0,8}", b in "\\PC{0,8}") {
        prop_assert_eq!(compare_names(&a, &b), compare_names(&b, &a).reverse());
    }
}
