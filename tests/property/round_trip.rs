//! Property-based tests for the manifest artifact round-trip law

use docnav::manifest::codec::{from_json_str, to_json_string};
use docnav::manifest::{Manifest, Metadata, MetadataValue, Node};
use docnav::tree::hasher::compute_node_id;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn metadata_value() -> impl Strategy<Value = MetadataValue> {
    prop_oneof![
        any::<bool>().prop_map(MetadataValue::Bool),
        any::<i64>().prop_map(MetadataValue::Integer),
        (-1.0e6f64..1.0e6).prop_map(|f| MetadataValue::Float(f.trunc() + 0.5)),
        "[ -~]{0,12}".prop_map(MetadataValue::String),
    ]
}

fn metadata() -> impl Strategy<Value = Metadata> {
    prop::collection::btree_map("[a-z]{1,6}", metadata_value(), 0..4)
}

/// Root with `groups` directories, each holding the given documents.
fn manifest() -> impl Strategy<Value = Manifest> {
    prop::collection::vec(prop::collection::vec(metadata(), 0..4), 0..4).prop_map(|groups| {
        let root_id = compute_node_id("");
        let mut root = Node::directory(root_id, "root".into(), "".into(), 0);
        let mut nodes = BTreeMap::new();
        let mut root_children = Vec::new();

        for (d, docs) in groups.into_iter().enumerate() {
            let dir_path = format!("d{}", d);
            let dir_id = compute_node_id(&dir_path);
            let mut dir = Node::directory(dir_id, dir_path.clone(), dir_path.clone(), d as u32);
            let mut children = Vec::new();
            for (f, meta) in docs.into_iter().enumerate() {
                let name = format!("f{}.md", f);
                let path = format!("{}/{}", dir_path, name);
                let id = compute_node_id(&path);
                nodes.insert(id, Node::document(id, name, path, f as u32, meta));
                children.push(id);
            }
            dir.children = Some(children);
            nodes.insert(dir_id, dir);
            root_children.push(dir_id);
        }
        root.children = Some(root_children);
        nodes.insert(root_id, root);
        Manifest::from_parts(root_id, nodes).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_manifest_round_trips(manifest in manifest()) {
        let json = to_json_string(&manifest).unwrap();
        let decoded = from_json_str(&json).unwrap();
        prop_assert_eq!(&decoded, &manifest);
        prop_assert_eq!(to_json_string(&decoded).unwrap(), json);
    }
}
