//! Filesystem walker for traversing content trees.
//!
//! Traversal uses an explicit work stack instead of recursion. Each directory
//! frame carries the set of canonical ancestor paths so symlinks that point
//! back up the tree are detected and skipped instead of looping.

use crate::error::BuildError;
use crate::tree::filter::EntryFilter;
use crate::tree::path;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Walked entry, emitted in depth-first pre-order with siblings sorted by
/// [`path::compare_names`].
#[derive(Debug, Clone)]
pub enum Entry {
    /// A directory with its normalized relative path (`""` for the root)
    Directory { path: String, name: String },
    /// A candidate document and where to read it from. `source_path` is the
    /// relative path as spelled on disk, which may differ from the normalized
    /// `path`.
    Document {
        path: String,
        name: String,
        source: PathBuf,
        source_path: String,
        size: u64,
    },
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::Directory { path, .. } | Entry::Document { path, .. } => path,
        }
    }

    /// Relative path of the containing directory; `None` for the root.
    pub fn parent_path(&self) -> Option<&str> {
        let path = self.path();
        if path.is_empty() {
            return None;
        }
        Some(path.rsplit_once('/').map_or("", |(parent, _)| parent))
    }
}

/// Non-fatal problems found while building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Symlink resolving to one of its own ancestors
    SymlinkCycle,
    /// Symlink resolving outside the build root
    SymlinkEscapesRoot,
    /// Symlink whose target does not exist
    BrokenSymlink,
    /// Entry that could not be listed, stat'ed or read
    Unreadable,
    /// File name that is not valid UTF-8
    InvalidName,
    /// Sibling whose normalized name equals an earlier sibling's
    NameCollision,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningKind::SymlinkCycle => "symlink cycle",
            WarningKind::SymlinkEscapesRoot => "symlink escapes root",
            WarningKind::BrokenSymlink => "broken symlink",
            WarningKind::Unreadable => "unreadable",
            WarningKind::InvalidName => "invalid name",
            WarningKind::NameCollision => "name collision",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildWarning {
    pub kind: WarningKind,
    /// Relative path of the omitted entry (lossy for invalid names)
    pub path: String,
    pub detail: String,
}

impl BuildWarning {
    pub fn new(kind: WarningKind, path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.kind, self.path, self.detail)
    }
}

/// Filesystem walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symlinks that stay inside the root (default: true).
    /// When false, symlinks are skipped silently.
    pub follow_symlinks: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct WalkOutput {
    pub entries: Vec<Entry>,
    pub warnings: Vec<BuildWarning>,
}

enum Work {
    Directory {
        rel: String,
        source_rel: String,
        name: String,
        listed: PathBuf,
        canonical: PathBuf,
        /// Canonical paths of this directory and all its ancestors
        ancestors: Arc<HashSet<PathBuf>>,
    },
    Document {
        rel: String,
        source_rel: String,
        name: String,
        source: PathBuf,
    },
}

struct Child {
    /// NFC-normalized name
    name: String,
    /// Name as returned by the filesystem
    raw: String,
    rel: String,
    source_rel: String,
    listed: PathBuf,
    kind: ChildKind,
}

enum ChildKind {
    Directory { canonical: PathBuf },
    File,
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the tree. Fails only if the root itself is unusable.
    pub fn walk(&self, filter: &dyn EntryFilter) -> Result<WalkOutput, BuildError> {
        let root = path::canonicalize_root(&self.root)?;
        let meta = fs::metadata(&root).map_err(|_| BuildError::RootNotFound(self.root.clone()))?;
        if !meta.is_dir() {
            return Err(BuildError::RootNotFound(self.root.clone()));
        }
        // Probe readability up front so an unreadable root is fatal rather than a warning.
        fs::read_dir(&root).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BuildError::RootNotFound(self.root.clone()),
            _ => BuildError::PermissionDenied(self.root.clone()),
        })?;

        let root_name = root
            .file_name()
            .and_then(|n| n.to_str())
            .map(path::normalize_name)
            .unwrap_or_default();

        let mut out = WalkOutput::default();
        let mut ancestors = HashSet::new();
        ancestors.insert(root.clone());
        let mut stack = vec![Work::Directory {
            rel: String::new(),
            source_rel: String::new(),
            name: root_name,
            listed: root.clone(),
            canonical: root.clone(),
            ancestors: Arc::new(ancestors),
        }];

        while let Some(work) = stack.pop() {
            match work {
                Work::Document {
                    rel,
                    source_rel,
                    name,
                    source,
                } => match fs::metadata(&source) {
                    Ok(meta) => {
                        trace!(path = %rel, "Document");
                        out.entries.push(Entry::Document {
                            path: rel,
                            name,
                            source,
                            source_path: source_rel,
                            size: meta.len(),
                        });
                    }
                    Err(e) => {
                        warn!(path = %rel, error = %e, "Skipping unreadable document");
                        out.warnings.push(BuildWarning::new(
                            WarningKind::Unreadable,
                            rel,
                            e.to_string(),
                        ));
                    }
                },
                Work::Directory {
                    rel,
                    source_rel,
                    name,
                    listed,
                    canonical,
                    ancestors,
                } => {
                    let children = match self.list_children(
                        &root,
                        &rel,
                        &source_rel,
                        &listed,
                        &canonical,
                        &ancestors,
                        filter,
                        &mut out.warnings,
                    ) {
                        Ok(children) => children,
                        Err(e) => {
                            warn!(path = %rel, error = %e, "Skipping unreadable directory");
                            out.warnings.push(BuildWarning::new(
                                WarningKind::Unreadable,
                                rel,
                                e.to_string(),
                            ));
                            continue;
                        }
                    };
                    trace!(path = %rel, children = children.len(), "Directory");
                    out.entries.push(Entry::Directory {
                        path: rel,
                        name,
                    });

                    // Reverse push so the first sibling is popped first.
                    for child in children.into_iter().rev() {
                        match child.kind {
                            ChildKind::File => stack.push(Work::Document {
                                rel: child.rel,
                                source_rel: child.source_rel,
                                name: child.name,
                                source: child.listed,
                            }),
                            ChildKind::Directory {
                                canonical: child_canonical,
                            } => {
                                let mut set = (*ancestors).clone();
                                set.insert(child_canonical.clone());
                                stack.push(Work::Directory {
                                    rel: child.rel,
                                    source_rel: child.source_rel,
                                    name: child.name,
                                    listed: child.listed,
                                    canonical: child_canonical,
                                    ancestors: Arc::new(set),
                                });
                            }
                        }
                    }
                }
            }
        }

        debug!(
            entries = out.entries.len(),
            warnings = out.warnings.len(),
            "Walk completed"
        );
        Ok(out)
    }

    /// List, classify, filter and sort the children of one directory.
    ///
    /// Siblings whose names normalize to the same string keep only the first
    /// by raw-byte order; the rest are dropped with a `NameCollision` warning.
    #[allow(clippy::too_many_arguments)]
    fn list_children(
        &self,
        root: &Path,
        rel: &str,
        source_rel: &str,
        listed: &Path,
        canonical: &Path,
        ancestors: &HashSet<PathBuf>,
        filter: &dyn EntryFilter,
        warnings: &mut Vec<BuildWarning>,
    ) -> std::io::Result<Vec<Child>> {
        let mut children = Vec::new();

        for entry in fs::read_dir(listed)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warnings.push(BuildWarning::new(
                        WarningKind::Unreadable,
                        rel,
                        format!("failed to read directory entry: {}", e),
                    ));
                    continue;
                }
            };

            let raw_name = entry.file_name();
            let Some(raw) = raw_name.to_str().map(str::to_string) else {
                let lossy = path::join(rel, &raw_name.to_string_lossy());
                warn!(path = %lossy, "Skipping entry with non UTF-8 name");
                warnings.push(BuildWarning::new(
                    WarningKind::InvalidName,
                    lossy,
                    "file name is not valid UTF-8",
                ));
                continue;
            };
            let name = path::normalize_name(&raw);
            let child_rel = path::join(rel, &name);
            let child_listed = entry.path();

            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    warnings.push(BuildWarning::new(
                        WarningKind::Unreadable,
                        child_rel,
                        e.to_string(),
                    ));
                    continue;
                }
            };

            let kind = if file_type.is_symlink() {
                if !self.config.follow_symlinks {
                    continue;
                }
                if !filter.include_directory(&child_rel, &name)
                    && !filter.include_document(&child_rel, &name)
                {
                    continue;
                }
                match self.resolve_symlink(root, &child_rel, &child_listed, ancestors) {
                    Ok(kind) => kind,
                    Err(warning) => {
                        warn!(path = %warning.path, kind = %warning.kind, "Skipping symlink");
                        warnings.push(warning);
                        continue;
                    }
                }
            } else if file_type.is_dir() {
                // A real directory under a canonical parent adds no indirection.
                ChildKind::Directory {
                    canonical: canonical.join(&raw_name),
                }
            } else if file_type.is_file() {
                ChildKind::File
            } else {
                // Sockets, fifos, devices
                continue;
            };

            let included = match kind {
                ChildKind::Directory { .. } => filter.include_directory(&child_rel, &name),
                ChildKind::File => filter.include_document(&child_rel, &name),
            };
            if !included {
                continue;
            }

            let child_source_rel = if source_rel.is_empty() {
                raw.clone()
            } else {
                format!("{}/{}", source_rel, raw)
            };
            children.push(Child {
                name,
                raw,
                rel: child_rel,
                source_rel: child_source_rel,
                listed: child_listed,
                kind,
            });
        }

        children.sort_by(|a, b| {
            path::compare_names(&a.name, &b.name).then_with(|| a.raw.as_bytes().cmp(b.raw.as_bytes()))
        });

        let mut kept: Vec<Child> = Vec::with_capacity(children.len());
        for child in children {
            if kept.last().map_or(false, |prev| prev.name == child.name) {
                warn!(path = %child.rel, "Skipping entry whose normalized name is taken");
                warnings.push(BuildWarning::new(
                    WarningKind::NameCollision,
                    child.source_rel,
                    format!("normalizes to {:?}, already used by a sibling", child.rel),
                ));
                continue;
            }
            kept.push(child);
        }
        Ok(kept)
    }

    fn resolve_symlink(
        &self,
        root: &Path,
        rel: &str,
        listed: &Path,
        ancestors: &HashSet<PathBuf>,
    ) -> Result<ChildKind, BuildWarning> {
        let target = dunce::canonicalize(listed).map_err(|e| {
            BuildWarning::new(WarningKind::BrokenSymlink, rel, e.to_string())
        })?;

        if !target.starts_with(root) {
            return Err(BuildWarning::new(
                WarningKind::SymlinkEscapesRoot,
                rel,
                format!("target {} is outside the root", target.display()),
            ));
        }

        let meta = fs::metadata(&target)
            .map_err(|e| BuildWarning::new(WarningKind::Unreadable, rel, e.to_string()))?;

        if meta.is_dir() {
            if ancestors.contains(&target) {
                return Err(BuildWarning::new(
                    WarningKind::SymlinkCycle,
                    rel,
                    format!("target {} is an ancestor", target.display()),
                ));
            }
            Ok(ChildKind::Directory { canonical: target })
        } else {
            Ok(ChildKind::File)
        }
    }
}
