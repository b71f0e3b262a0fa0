//! Path canonicalization and normalization utilities

use crate::error::BuildError;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize the build root.
///
/// Resolves symlinks, `..` and `.` so the walker can compare symlink targets
/// against the root. Missing roots map to `RootNotFound`, unreadable ones to
/// `PermissionDenied`.
pub fn canonicalize_root(path: &Path) -> Result<PathBuf, BuildError> {
    dunce::canonicalize(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => BuildError::PermissionDenied(path.to_path_buf()),
        _ => BuildError::RootNotFound(path.to_path_buf()),
    })
}

/// Normalize a single file name for use in a manifest path.
///
/// Only Unicode NFC is applied. A name is one segment even if it contains a
/// backslash, which is an ordinary character on Unix filesystems.
pub fn normalize_name(name: &str) -> String {
    name.nfc().collect()
}

/// True if a normalized relative path stays inside its root.
pub fn is_safe_relative(path: &str) -> bool {
    !path.split('/').any(|segment| segment == "..")
}

/// Join a normalized parent path and a child name.
pub fn join(parent: &str, name: &str) -> String {
    let name = normalize_name(name);
    if parent.is_empty() {
        name
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Sibling ordering: case-folded NFC comparison, ties broken by raw bytes.
///
/// Independent of locale and of the order the filesystem returns entries in.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

fn fold(name: &str) -> String {
    name.nfc().flat_map(char::to_lowercase).collect()
}
