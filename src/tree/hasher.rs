//! Identifier and fingerprint computation using BLAKE3

use crate::types::{Hash, NodeId};
use blake3::Hasher;

/// Compute the NodeId for a normalized relative path.
///
/// NodeId = hash("docnav-node" || path_len || path)
///
/// The id depends only on the path, never on content or kind, so the same
/// file keeps its id across rebuilds and content changes. The root is the
/// empty path.
pub fn compute_node_id(normalized_path: &str) -> NodeId {
    let path_bytes = normalized_path.as_bytes();

    let mut hasher = Hasher::new();

    // Domain separator
    hasher.update(b"docnav-node");

    // Path length (8 bytes, big-endian) then path
    hasher.update(&(path_bytes.len() as u64).to_be_bytes());
    hasher.update(path_bytes);

    NodeId::from_bytes(*hasher.finalize().as_bytes())
}

/// Compute content hash for file bytes
pub fn compute_content_hash(content: &[u8]) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(content);
    *hasher.finalize().as_bytes()
}

/// Hex fingerprint of document content, as stored in node metadata.
pub fn content_fingerprint(content: &[u8]) -> String {
    hex::encode(compute_content_hash(content))
}
