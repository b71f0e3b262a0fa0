//! Manifest node types

use crate::types::{Fingerprint, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata keys written by the builder
pub mod keys {
    pub const SIZE: &str = "size";
    pub const FINGERPRINT: &str = "fingerprint";
    pub const TITLE: &str = "title";
    pub const MODIFIED: &str = "modified";
    pub const DOCUMENTS: &str = "documents";
    /// On-disk relative path, present only when it differs from `path`
    pub const SOURCE_PATH: &str = "source_path";
}

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    Document,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Directory => f.write_str("directory"),
            NodeKind::Document => f.write_str("document"),
        }
    }
}

/// Closed set of scalar metadata values.
///
/// Untagged on the wire, so JSON scalars map directly: strings, integers,
/// floats and booleans. Anything else is rejected at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Integer(i) => write!(f, "{}", i),
            MetadataValue::Float(x) => write!(f, "{}", x),
            MetadataValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// One file or directory in the content tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    /// Normalized relative path; `""` for the root
    pub path: String,
    /// Position among siblings
    pub order: u32,
    /// Child ids in display order; `None` for documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeId>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl Node {
    pub fn directory(id: NodeId, name: String, path: String, order: u32) -> Self {
        Self {
            id,
            kind: NodeKind::Directory,
            name,
            path,
            order,
            children: Some(Vec::new()),
            metadata: Metadata::new(),
        }
    }

    pub fn document(id: NodeId, name: String, path: String, order: u32, metadata: Metadata) -> Self {
        Self {
            id,
            kind: NodeKind::Document,
            name,
            path,
            order,
            children: None,
            metadata,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_document(&self) -> bool {
        self.kind == NodeKind::Document
    }

    /// Child ids; empty for documents.
    pub fn child_ids(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Title override from metadata, falling back to the file name.
    pub fn title(&self) -> &str {
        self.metadata
            .get(keys::TITLE)
            .and_then(MetadataValue::as_str)
            .unwrap_or(&self.name)
    }

    /// Relative path to read the document from. Differs from `path` only
    /// when the on-disk name was not already in NFC.
    pub fn source_path(&self) -> &str {
        self.metadata
            .get(keys::SOURCE_PATH)
            .and_then(MetadataValue::as_str)
            .unwrap_or(&self.path)
    }

    /// Content version used to key the content cache.
    ///
    /// Prefers the content fingerprint, then the size; documents built without
    /// either get the empty fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        if let Some(fp) = self.metadata.get(keys::FINGERPRINT).and_then(MetadataValue::as_str) {
            return Fingerprint::new(fp);
        }
        match self.metadata.get(keys::SIZE) {
            Some(size) => Fingerprint::new(format!("size:{}", size)),
            None => Fingerprint::default(),
        }
    }
}
