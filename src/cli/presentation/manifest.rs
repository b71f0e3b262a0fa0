//! Manifest presentation: build summaries, inspect and validate output.

use super::shared::format_section_heading;
use crate::error::ApiError;
use crate::manifest::{Manifest, NodeKind, SCHEMA_VERSION};
use crate::nav::NavigationStore;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::sync::Arc;

/// Counts shown by `inspect`, `validate` and `build`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    pub schema_version: u32,
    pub root: String,
    pub nodes: usize,
    pub documents: usize,
    pub directories: usize,
}

impl ManifestSummary {
    pub fn of(manifest: &Manifest) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            root: manifest.root_id().to_hex(),
            nodes: manifest.len(),
            documents: manifest.document_count(),
            directories: manifest.directory_count(),
        }
    }
}

/// Result of `docnav build`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub out: String,
    #[serde(flatten)]
    pub manifest: ManifestSummary,
    pub warnings: usize,
    pub duration_ms: u128,
}

pub fn format_build_summary(summary: &BuildSummary, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(summary);
    }
    Ok(format!(
        "Wrote {} ({} nodes: {} documents, {} directories) in {}ms, {} warning(s)",
        summary.out,
        summary.manifest.nodes,
        summary.manifest.documents,
        summary.manifest.directories,
        summary.duration_ms,
        summary.warnings
    ))
}

/// Summary table followed by the fully expanded tree.
pub fn format_inspect_text(manifest: &Arc<Manifest>) -> String {
    let summary = ManifestSummary::of(manifest);
    let mut out = String::new();

    out.push_str(&format!("{}\n\n", format_section_heading("Manifest")));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Schema version".to_string(), summary.schema_version.to_string()]);
    table.add_row(vec!["Root".to_string(), manifest.root_id().short()]);
    table.add_row(vec!["Nodes".to_string(), summary.nodes.to_string()]);
    table.add_row(vec!["Documents".to_string(), summary.documents.to_string()]);
    table.add_row(vec!["Directories".to_string(), summary.directories.to_string()]);
    out.push_str(&format!("{}\n\n", table));

    out.push_str(&format!("{}\n\n", format_section_heading("Tree")));
    let mut store = NavigationStore::new(Arc::clone(manifest));
    store.expand_all();
    let rows = store.visible_rows();
    if rows.is_empty() {
        out.push_str("(empty)\n");
    }
    for row in rows {
        let indent = "  ".repeat(row.depth);
        match row.kind {
            NodeKind::Directory => {
                out.push_str(&format!("{}{}/\n", indent, row.name.blue().bold()))
            }
            NodeKind::Document => out.push_str(&format!("{}{}\n", indent, row.name)),
        }
    }
    out
}

#[derive(Serialize)]
struct InspectRow {
    address: String,
    path: String,
    kind: NodeKind,
    depth: usize,
    title: String,
}

#[derive(Serialize)]
struct InspectOutput {
    #[serde(flatten)]
    summary: ManifestSummary,
    rows: Vec<InspectRow>,
}

pub fn format_inspect_json(manifest: &Arc<Manifest>) -> Result<String, ApiError> {
    let mut store = NavigationStore::new(Arc::clone(manifest));
    store.expand_all();
    let rows = store
        .visible_rows()
        .into_iter()
        .filter_map(|row| {
            let node = manifest.get(&row.id)?;
            Some(InspectRow {
                address: crate::nav::format_address(&node.path),
                path: node.path.clone(),
                kind: node.kind,
                depth: row.depth,
                title: node.title().to_string(),
            })
        })
        .collect();
    to_json(&InspectOutput {
        summary: ManifestSummary::of(manifest),
        rows,
    })
}

pub fn format_validate_text(manifest: &Manifest) -> String {
    let summary = ManifestSummary::of(manifest);
    format!(
        "Manifest valid:\n  Schema version: {}\n  Nodes: {}\n  Documents: {}\n  Directories: {}",
        summary.schema_version, summary.nodes, summary.documents, summary.directories
    )
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::Io(e.to_string()))
}
