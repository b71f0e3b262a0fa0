//! Manifest builder: walks a content root and assembles a [`Manifest`].

use crate::error::BuildError;
use crate::manifest::node::keys;
use crate::manifest::{Manifest, Metadata, MetadataValue, Node, NodeKind};
use crate::tree::filter::{EntryFilter, ExtensionFilter};
use crate::tree::hasher;
use crate::tree::walker::{Entry, Walker, WalkerConfig};
use crate::types::NodeId;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

pub use crate::tree::walker::{BuildWarning, WarningKind};

/// Build options
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Record a `modified` timestamp per document. Off by default because it
    /// makes the artifact depend on filesystem state beyond content.
    pub include_mtime: bool,
    /// Drop directories with no documents anywhere below them.
    pub prune_empty_dirs: bool,
    /// Follow symlinks that stay inside the root
    pub follow_symlinks: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            include_mtime: false,
            prune_empty_dirs: false,
            follow_symlinks: true,
        }
    }
}

/// A manifest plus the non-fatal warnings collected while building it
#[derive(Debug)]
pub struct BuildOutput {
    pub manifest: Manifest,
    pub warnings: Vec<BuildWarning>,
}

/// Manifest builder
pub struct ManifestBuilder {
    root: PathBuf,
    filter: Box<dyn EntryFilter>,
    options: BuildOptions,
}

impl ManifestBuilder {
    /// Create a builder for `root` with the default extension filter
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            filter: Box::new(ExtensionFilter::default()),
            options: BuildOptions::default(),
        }
    }

    pub fn with_filter(mut self, filter: impl EntryFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build the manifest.
    ///
    /// Fails only when the root is missing or unreadable. Everything else
    /// that goes wrong is recorded as a warning and the entry is left out.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self) -> Result<BuildOutput, BuildError> {
        let start = Instant::now();
        info!("Starting manifest build");

        let walker = Walker::with_config(
            self.root.clone(),
            WalkerConfig {
                follow_symlinks: self.options.follow_symlinks,
            },
        );
        let walked = walker.walk(self.filter.as_ref())?;
        debug!(entry_count = walked.entries.len(), "Walked content root");

        let mut warnings = walked.warnings;
        let mut nodes: BTreeMap<NodeId, Node> = BTreeMap::new();
        // Insertion order is pre-order; reversed it visits children before parents.
        let mut preorder: Vec<NodeId> = Vec::with_capacity(walked.entries.len());
        let mut root_id = None;

        for entry in walked.entries {
            let id = hasher::compute_node_id(entry.path());
            let parent_id = entry.parent_path().map(hasher::compute_node_id);

            let order = match parent_id {
                Some(parent_id) => match nodes.get(&parent_id).and_then(|p| p.children.as_ref()) {
                    Some(siblings) => siblings.len() as u32,
                    None => {
                        // Walker emits parents first; a miss means the parent was dropped.
                        warn!(path = %entry.path(), "Parent missing, skipping entry");
                        continue;
                    }
                },
                None => 0,
            };

            let node = match entry {
                Entry::Directory { path, name } => Node::directory(id, name, path, order),
                Entry::Document {
                    path,
                    name,
                    source,
                    source_path,
                    size,
                } => match self.document_metadata(&source, size) {
                    Ok(mut metadata) => {
                        if source_path != path {
                            metadata.insert(
                                keys::SOURCE_PATH.to_string(),
                                MetadataValue::String(source_path),
                            );
                        }
                        Node::document(id, name, path, order, metadata)
                    }
                    Err(e) => {
                        warn!(path = %path, error = %e, "Skipping unreadable document");
                        warnings.push(BuildWarning::new(WarningKind::Unreadable, path, e.to_string()));
                        continue;
                    }
                },
            };
            trace!(path = %node.path, kind = %node.kind, "Node");

            match parent_id {
                Some(parent_id) => {
                    if let Some(children) = nodes.get_mut(&parent_id).and_then(|p| p.children.as_mut()) {
                        children.push(id);
                    }
                }
                None => root_id = Some(id),
            }
            nodes.insert(id, node);
            preorder.push(id);
        }

        let root_id = root_id.ok_or_else(|| BuildError::RootNotFound(self.root.clone()))?;

        annotate_directories(&mut nodes, &preorder, root_id, self.options.prune_empty_dirs);

        let manifest = Manifest::from_parts(root_id, nodes)?;

        info!(
            node_count = manifest.len(),
            documents = manifest.document_count(),
            warnings = warnings.len(),
            root_id = %root_id.short(),
            duration_ms = start.elapsed().as_millis(),
            "Manifest build completed"
        );

        Ok(BuildOutput { manifest, warnings })
    }

    fn document_metadata(&self, source: &Path, size: u64) -> std::io::Result<Metadata> {
        let content = std::fs::read(source)?;

        let mut metadata = Metadata::new();
        metadata.insert(keys::SIZE.to_string(), MetadataValue::Integer(size as i64));
        metadata.insert(
            keys::FINGERPRINT.to_string(),
            MetadataValue::String(hasher::content_fingerprint(&content)),
        );
        if is_markdown(source) {
            if let Some(title) = std::str::from_utf8(&content).ok().and_then(extract_title) {
                metadata.insert(keys::TITLE.to_string(), MetadataValue::String(title));
            }
        }
        if self.options.include_mtime {
            let modified: DateTime<Utc> = std::fs::metadata(source)?.modified()?.into();
            metadata.insert(
                keys::MODIFIED.to_string(),
                MetadataValue::Integer(modified.timestamp()),
            );
        }
        Ok(metadata)
    }
}

/// Fill in per-directory document counts and optionally prune directories
/// that contain no documents. Orders are renumbered after pruning.
fn annotate_directories(
    nodes: &mut BTreeMap<NodeId, Node>,
    preorder: &[NodeId],
    root_id: NodeId,
    prune_empty_dirs: bool,
) {
    let mut counts: HashMap<NodeId, i64> = HashMap::with_capacity(nodes.len());

    for id in preorder.iter().rev() {
        let Some(node) = nodes.get(id) else { continue };
        match node.kind {
            NodeKind::Document => {
                counts.insert(*id, 1);
            }
            NodeKind::Directory => {
                let total: i64 = node
                    .child_ids()
                    .iter()
                    .map(|c| counts.get(c).copied().unwrap_or(0))
                    .sum();
                counts.insert(*id, total);
            }
        }
    }

    if prune_empty_dirs {
        let empty: Vec<NodeId> = preorder
            .iter()
            .filter(|id| **id != root_id)
            .filter(|id| {
                nodes.get(id).map_or(false, Node::is_directory)
                    && counts.get(id).copied().unwrap_or(0) == 0
            })
            .copied()
            .collect();
        for id in &empty {
            nodes.remove(id);
        }
        for node in nodes.values_mut() {
            if let Some(children) = node.children.as_mut() {
                children.retain(|c| !empty.contains(c));
            }
        }
        let reorder: Vec<(NodeId, u32)> = nodes
            .values()
            .flat_map(|n| n.child_ids().iter().enumerate().map(|(i, c)| (*c, i as u32)))
            .collect();
        for (id, order) in reorder {
            if let Some(node) = nodes.get_mut(&id) {
                node.order = order;
            }
        }
    }

    for node in nodes.values_mut() {
        if node.is_directory() {
            let count = counts.get(&node.id).copied().unwrap_or(0);
            node.metadata
                .insert(keys::DOCUMENTS.to_string(), MetadataValue::Integer(count));
        }
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
}

/// First ATX level-1 heading, skipping a leading front-matter block.
fn extract_title(text: &str) -> Option<String> {
    let mut in_front_matter = false;
    let mut first = true;
    for line in text.lines() {
        let trimmed = line.trim();
        if first && trimmed == "---" {
            in_front_matter = true;
            first = false;
            continue;
        }
        first = false;
        if in_front_matter {
            if trimmed == "---" {
                in_front_matter = false;
            }
            continue;
        }
        if let Some(title) = trimmed.strip_prefix("# ") {
            let title = title.trim().trim_end_matches('#').trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}
