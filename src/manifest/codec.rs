//! Manifest artifact encoding.
//!
//! The artifact is a JSON document with a mandatory `schema_version` at the
//! root. Nodes are written in depth-first pre-order, so the output for a given
//! manifest is byte-stable.

use super::{Manifest, Node, SCHEMA_VERSION};
use crate::error::ManifestError;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};

#[derive(Serialize)]
struct ManifestDocumentRef<'a> {
    schema_version: u32,
    root: NodeId,
    nodes: Vec<&'a Node>,
}

#[derive(Deserialize)]
struct ManifestDocument {
    #[allow(dead_code)]
    schema_version: u64,
    root: NodeId,
    nodes: Vec<Node>,
}

#[derive(Deserialize)]
struct VersionProbe {
    schema_version: Option<u64>,
}

/// Serialize a manifest to its pretty-printed JSON artifact.
pub fn to_json_string(manifest: &Manifest) -> Result<String, ManifestError> {
    let doc = ManifestDocumentRef {
        schema_version: SCHEMA_VERSION,
        root: manifest.root_id(),
        nodes: manifest.iter_preorder(),
    };
    let mut out = serde_json::to_string_pretty(&doc)
        .map_err(|e| ManifestError::Malformed(format!("Failed to serialize manifest: {}", e)))?;
    out.push('\n');
    Ok(out)
}

pub fn to_json_bytes(manifest: &Manifest) -> Result<Vec<u8>, ManifestError> {
    to_json_string(manifest).map(String::into_bytes)
}

/// Parse a manifest artifact.
///
/// The schema version is checked before anything else is interpreted, so an
/// artifact from a different schema fails with `UnsupportedSchemaVersion`
/// rather than a field-level parse error.
pub fn from_json_str(input: &str) -> Result<Manifest, ManifestError> {
    let probe: VersionProbe = serde_json::from_str(input)
        .map_err(|e| ManifestError::Malformed(format!("Invalid manifest JSON: {}", e)))?;
    match probe.schema_version {
        None => {
            return Err(ManifestError::Malformed(
                "missing schema_version".to_string(),
            ))
        }
        Some(found) if found != u64::from(SCHEMA_VERSION) => {
            return Err(ManifestError::UnsupportedSchemaVersion {
                found,
                supported: SCHEMA_VERSION,
            })
        }
        Some(_) => {}
    }

    let doc: ManifestDocument = serde_json::from_str(input)
        .map_err(|e| ManifestError::Malformed(format!("Invalid manifest: {}", e)))?;

    let mut nodes = BTreeMap::new();
    for node in doc.nodes {
        let id = node.id;
        if nodes.insert(id, node).is_some() {
            return Err(ManifestError::Inconsistent(format!("duplicate node id {}", id)));
        }
    }
    Manifest::from_parts(doc.root, nodes)
}

pub fn from_json_slice(input: &[u8]) -> Result<Manifest, ManifestError> {
    let text = std::str::from_utf8(input)
        .map_err(|e| ManifestError::Malformed(format!("Manifest is not UTF-8: {}", e)))?;
    from_json_str(text)
}

/// Write the artifact next to `path` and rename it into place so readers
/// never observe a partial manifest.
#[instrument(skip(manifest), fields(path = %path.display()))]
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), ManifestError> {
    let bytes = to_json_bytes(manifest)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ManifestError::Io(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "manifest.json".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut file = std::fs::File::create(&tmp_path).map_err(|e| {
        ManifestError::Io(format!("Failed to create {}: {}", tmp_path.display(), e))
    })?;
    file.write_all(&bytes)
        .and_then(|_| file.sync_all())
        .map_err(|e| ManifestError::Io(format!("Failed to write {}: {}", tmp_path.display(), e)))?;
    drop(file);

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        ManifestError::Io(format!("Failed to move manifest into place: {}", e))
    })?;

    debug!(bytes = bytes.len(), "Manifest written");
    Ok(())
}

#[instrument(fields(path = %path.display()))]
pub fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ManifestError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    from_json_slice(&bytes)
}
