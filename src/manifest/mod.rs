//! Manifest: the ordered, addressable description of a content tree.
//!
//! A manifest is a synthetic root directory plus a flat lookup table from
//! [`NodeId`] to [`Node`]. The table and the tree are kept consistent: every id
//! reachable from the root is in the table and every table entry is reachable
//! from the root exactly once.

pub mod codec;
pub mod node;

pub use node::{Metadata, MetadataValue, Node, NodeKind};

use crate::error::ManifestError;
use crate::types::NodeId;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Current manifest schema version
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct Manifest {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
    /// Derived on construction; not part of the artifact
    parent_map: HashMap<NodeId, NodeId>,
    path_index: HashMap<String, NodeId>,
}

impl PartialEq for Manifest {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.nodes == other.nodes
    }
}

impl Manifest {
    /// Build a manifest from a root id and its node table, validating that the
    /// tree and the table agree.
    pub fn from_parts(root: NodeId, nodes: BTreeMap<NodeId, Node>) -> Result<Self, ManifestError> {
        let root_node = nodes.get(&root).ok_or_else(|| {
            ManifestError::Inconsistent(format!("root {} missing from lookup table", root))
        })?;
        if !root_node.is_directory() {
            return Err(ManifestError::Inconsistent(
                "root node must be a directory".to_string(),
            ));
        }

        for (key, node) in &nodes {
            if *key != node.id {
                return Err(ManifestError::Inconsistent(format!(
                    "lookup key {} does not match node id {}",
                    key, node.id
                )));
            }
            match (node.kind, &node.children) {
                (NodeKind::Directory, None) => {
                    return Err(ManifestError::Inconsistent(format!(
                        "directory {:?} has no children list",
                        node.path
                    )))
                }
                (NodeKind::Document, Some(_)) => {
                    return Err(ManifestError::Inconsistent(format!(
                        "document {:?} has a children list",
                        node.path
                    )))
                }
                _ => {}
            }
        }

        // Iterative walk from root; each node must be reached exactly once.
        let mut parent_map = HashMap::with_capacity(nodes.len());
        let mut path_index = HashMap::with_capacity(nodes.len());
        let mut seen: HashSet<NodeId> = HashSet::with_capacity(nodes.len());
        let mut stack = vec![root];
        seen.insert(root);

        while let Some(id) = stack.pop() {
            let node = nodes.get(&id).ok_or_else(|| {
                ManifestError::Inconsistent(format!("child {} missing from lookup table", id))
            })?;
            if path_index.insert(node.path.clone(), id).is_some() {
                return Err(ManifestError::Inconsistent(format!(
                    "duplicate path {:?}",
                    node.path
                )));
            }
            for child in node.child_ids() {
                if !seen.insert(*child) {
                    return Err(ManifestError::Inconsistent(format!(
                        "node {} is reachable more than once",
                        child
                    )));
                }
                parent_map.insert(*child, id);
                stack.push(*child);
            }
        }

        if seen.len() != nodes.len() {
            let orphan = nodes
                .keys()
                .find(|id| !seen.contains(id))
                .map(|id| id.to_string())
                .unwrap_or_default();
            return Err(ManifestError::Inconsistent(format!(
                "{} orphaned node(s), e.g. {}",
                nodes.len() - seen.len(),
                orphan
            )));
        }

        Ok(Self {
            root,
            nodes: nodes.into_iter().collect(),
            parent_map,
            path_index,
        })
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &Node {
        // Presence of the root is checked in from_parts.
        &self.nodes[&self.root]
    }

    /// O(1) lookup by id without tree traversal
    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Lookup by normalized relative path
    pub fn get_by_path(&self, path: &str) -> Option<&Node> {
        self.path_index.get(path).and_then(|id| self.nodes.get(id))
    }

    pub fn parent(&self, id: &NodeId) -> Option<NodeId> {
        self.parent_map.get(id).copied()
    }

    /// Ancestors from the immediate parent up to and including the root.
    pub fn ancestors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = *id;
        while let Some(parent) = self.parent(&current) {
            out.push(parent);
            current = parent;
        }
        out
    }

    /// Children of a directory in display order; empty for documents.
    pub fn children(&self, id: &NodeId) -> impl Iterator<Item = &Node> {
        self.nodes
            .get(id)
            .map(|n| n.child_ids())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |child| self.nodes.get(child))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Nodes in depth-first pre-order following `children`.
    pub fn iter_preorder(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push(node);
                for child in node.child_ids().iter().rev() {
                    stack.push(*child);
                }
            }
        }
        out
    }

    pub fn document_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_document()).count()
    }

    pub fn directory_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_directory()).count()
    }
}
