//! Error types for manifest building, navigation and content resolution.

use crate::types::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal manifest build errors. Recoverable problems are reported as
/// [`crate::tree::builder::BuildWarning`]s instead.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Root not found or not a directory: {0}")]
    RootNotFound(PathBuf),

    #[error("Permission denied reading root: {0}")]
    PermissionDenied(PathBuf),

    #[error("Build I/O error: {0}")]
    Io(String),

    #[error("Built manifest is invalid: {0}")]
    Manifest(#[from] ManifestError),
}

/// Manifest artifact errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Unsupported manifest schema version {found} (supported: {supported})")]
    UnsupportedSchemaVersion { found: u64, supported: u32 },

    #[error("Malformed manifest: {0}")]
    Malformed(String),

    #[error("Inconsistent manifest: {0}")]
    Inconsistent(String),

    #[error("Manifest I/O error: {0}")]
    Io(String),
}

/// Navigation store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Address not found: {0}")]
    AddressNotFound(String),
}

/// Content resolution errors.
///
/// `Clone` so a single load outcome can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Not a document: {0}")]
    NotADocument(NodeId),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Transient I/O error: {0}")]
    TransientIo(String),

    #[error("Failed to decode document {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl LoadError {
    /// Only transient I/O failures are retried or superseded on the next call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::TransientIo(_))
    }
}

/// Errors reported by a content source collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("transient failure: {0}")]
    Transient(String),
}

/// Umbrella error for the CLI and configuration surfaces
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Nav(#[from] NavError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
