//! Sidebar navigation state: expansion, selection and deep links.

use crate::error::NavError;
use crate::manifest::{Manifest, NodeKind};
use crate::nav::address::{format_address, parse_address};
use crate::types::NodeId;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// One visible line of the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: NodeId,
    /// Nesting depth; children of the root are at depth 0
    pub depth: usize,
    pub kind: NodeKind,
    pub name: String,
    pub expanded: bool,
    pub selected: bool,
}

/// Navigation state over one manifest.
///
/// The root is always open and never listed as a row. Every other directory
/// starts collapsed.
#[derive(Debug, Clone)]
pub struct NavigationStore {
    manifest: Arc<Manifest>,
    expanded: HashSet<NodeId>,
    selected: NodeId,
}

impl NavigationStore {
    pub fn new(manifest: Arc<Manifest>) -> Self {
        let selected = manifest.root_id();
        Self {
            manifest,
            expanded: HashSet::new(),
            selected,
        }
    }

    /// Open the store on a deep link.
    ///
    /// On an unresolvable address the store selects the root and the
    /// `AddressNotFound` error is handed back alongside it.
    pub fn with_initial_address(manifest: Arc<Manifest>, address: &str) -> (Self, Option<NavError>) {
        let mut store = Self::new(manifest);
        let error = store.open_address(address).err();
        (store, error)
    }

    pub fn manifest(&self) -> &Arc<Manifest> {
        &self.manifest
    }

    pub fn selected(&self) -> NodeId {
        self.selected
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        *id == self.manifest.root_id() || self.expanded.contains(id)
    }

    /// Select a node, expanding every directory above it.
    pub fn select(&mut self, id: &NodeId) -> Result<(), NavError> {
        if !self.manifest.contains(id) {
            return Err(NavError::UnknownNode(*id));
        }
        let root = self.manifest.root_id();
        for ancestor in self.manifest.ancestors(id) {
            if ancestor != root {
                self.expanded.insert(ancestor);
            }
        }
        self.selected = *id;
        debug!(node = %id.short(), "Selected node");
        Ok(())
    }

    /// Flip a directory's expansion and return the new state.
    pub fn toggle(&mut self, id: &NodeId) -> Result<bool, NavError> {
        let node = self.manifest.get(id).ok_or(NavError::UnknownNode(*id))?;
        if node.is_document() {
            return Err(NavError::InvalidOperation(format!(
                "cannot toggle document {}",
                node.path
            )));
        }
        if *id == self.manifest.root_id() {
            return Err(NavError::InvalidOperation(
                "the root directory is always expanded".to_string(),
            ));
        }
        if self.expanded.remove(id) {
            Ok(false)
        } else {
            self.expanded.insert(*id);
            Ok(true)
        }
    }

    pub fn expand_all(&mut self) {
        let root = self.manifest.root_id();
        self.expanded = self
            .manifest
            .nodes()
            .filter(|n| n.is_directory() && n.id != root)
            .map(|n| n.id)
            .collect();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn resolve_address(&self, address: &str) -> Result<NodeId, NavError> {
        let path = parse_address(address)?;
        self.manifest
            .get_by_path(&path)
            .map(|node| node.id)
            .ok_or_else(|| NavError::AddressNotFound(address.to_string()))
    }

    /// Select the node a deep link points at, or fall back to the root.
    pub fn open_address(&mut self, address: &str) -> Result<NodeId, NavError> {
        match self.resolve_address(address) {
            Ok(id) => {
                self.select(&id)?;
                Ok(id)
            }
            Err(err) => {
                debug!(address, "Deep link did not resolve, selecting root");
                self.selected = self.manifest.root_id();
                Err(err)
            }
        }
    }

    pub fn address_of(&self, id: &NodeId) -> Result<String, NavError> {
        self.manifest
            .get(id)
            .map(|node| format_address(&node.path))
            .ok_or(NavError::UnknownNode(*id))
    }

    /// Swap in a rebuilt manifest, keeping expansion and selection for nodes
    /// that still exist.
    pub fn replace_manifest(&mut self, manifest: Arc<Manifest>) {
        self.expanded
            .retain(|id| manifest.get(id).is_some_and(|n| n.is_directory()));
        if !manifest.contains(&self.selected) {
            self.selected = manifest.root_id();
        }
        self.manifest = manifest;
    }

    /// The flattened sidebar: pre-order over expanded directories.
    pub fn visible_rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        let root = self.manifest.root_id();
        let mut stack: Vec<(NodeId, usize)> = self
            .manifest
            .root()
            .child_ids()
            .iter()
            .rev()
            .map(|id| (*id, 0))
            .collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.manifest.get(&id) else {
                continue;
            };
            let expanded = node.is_directory() && self.expanded.contains(&id);
            rows.push(Row {
                id,
                depth,
                kind: node.kind,
                name: node.name.clone(),
                expanded,
                selected: id == self.selected && id != root,
            });
            if expanded {
                stack.extend(node.child_ids().iter().rev().map(|child| (*child, depth + 1)));
            }
        }
        rows
    }
}
