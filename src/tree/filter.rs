//! Entry filtering for manifest builds.
//!
//! Directories are filtered only by ignore patterns; documents must also
//! match the extension allow-list.

use std::collections::BTreeSet;

/// Decides which entries become manifest nodes
pub trait EntryFilter: Send + Sync {
    /// Whether to descend into a directory named `name` at `path`.
    fn include_directory(&self, path: &str, name: &str) -> bool;

    /// Whether a file named `name` at `path` is a document.
    fn include_document(&self, path: &str, name: &str) -> bool;
}

/// Built-in ignore patterns
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[".git", "target", "node_modules", ".cargo"];

/// Default document extensions
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Extension allow-list plus name-based ignore patterns.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    /// Lowercase extensions without the leading dot; empty allows every file
    extensions: BTreeSet<String>,
    ignore_patterns: Vec<String>,
    include_hidden: bool,
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            ignore_patterns: DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            include_hidden: false,
        }
    }

    /// Accept every file regardless of extension.
    pub fn any_extension() -> Self {
        Self::new(std::iter::empty::<&str>())
    }

    pub fn with_ignore_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Ignore patterns match a whole name, a whole relative path, or a path
    /// prefix ending at a segment boundary.
    fn is_ignored(&self, path: &str, name: &str) -> bool {
        if !self.include_hidden && name.starts_with('.') {
            return true;
        }
        self.ignore_patterns.iter().any(|pattern| {
            let pattern = pattern.trim_end_matches('/');
            name == pattern
                || path == pattern
                || path
                    .strip_prefix(pattern)
                    .map_or(false, |rest| rest.starts_with('/'))
        })
    }

    fn extension_allowed(&self, name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self.extensions.contains(&ext.to_lowercase()),
            _ => false,
        }
    }
}

impl EntryFilter for ExtensionFilter {
    fn include_directory(&self, path: &str, name: &str) -> bool {
        !self.is_ignored(path, name)
    }

    fn include_document(&self, path: &str, name: &str) -> bool {
        !self.is_ignored(path, name) && self.extension_allowed(name)
    }
}
