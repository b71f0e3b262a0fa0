//! Content source collaborators.
//!
//! A source is addressed by manifest path, never by node id, and must report
//! "not found" distinctly from transient failures.

use crate::error::SourceError;
use crate::tree::path;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::trace;

/// Byte provider for document bodies
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the raw bytes stored at a normalized manifest path
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, SourceError>;

    /// Name used in logs
    fn source_name(&self) -> &str;
}

/// Reads documents from a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn fetch(&self, rel: &str) -> Result<Vec<u8>, SourceError> {
        if !path::is_safe_relative(rel) {
            return Err(SourceError::NotFound(rel.to_string()));
        }
        let full = rel
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment));
        trace!(path = %full.display(), "Reading document");
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(rel.to_string()))
            }
            Err(e) => Err(SourceError::Transient(format!("{}: {}", rel, e))),
        }
    }

    fn source_name(&self) -> &str {
        "filesystem"
    }
}

/// Scripted response for [`MockContentSource`]
#[derive(Debug, Clone)]
pub enum MockResponse {
    Bytes(Vec<u8>),
    NotFound,
    Transient(String),
    /// Fail transiently this many times, then return the bytes
    FlakyThen(usize, Vec<u8>),
}

/// In-memory source with an optional artificial delay and per-path call
/// counting, for tests and demos.
#[derive(Debug, Default)]
pub struct MockContentSource {
    responses: parking_lot::RwLock<HashMap<String, MockResponse>>,
    calls: parking_lot::Mutex<HashMap<String, usize>>,
    total_calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_text(self, path: &str, text: &str) -> Self {
        self.set(path, MockResponse::Bytes(text.as_bytes().to_vec()));
        self
    }

    pub fn with_response(self, path: &str, response: MockResponse) -> Self {
        self.set(path, response);
        self
    }

    /// Replace the response for a path (e.g. to simulate a deleted document).
    pub fn set(&self, path: &str, response: MockResponse) {
        self.responses.write().insert(path.to_string(), response);
    }

    pub fn remove(&self, path: &str) {
        self.responses.write().remove(path);
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let attempt = {
            let mut calls = self.calls.lock();
            let count = calls.entry(path.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.responses.read().get(path).cloned();
        match response {
            Some(MockResponse::Bytes(bytes)) => Ok(bytes),
            Some(MockResponse::Transient(msg)) => Err(SourceError::Transient(msg)),
            Some(MockResponse::FlakyThen(failures, bytes)) => {
                if attempt <= failures {
                    Err(SourceError::Transient(format!("attempt {} failed", attempt)))
                } else {
                    Ok(bytes)
                }
            }
            Some(MockResponse::NotFound) | None => Err(SourceError::NotFound(path.to_string())),
        }
    }

    fn source_name(&self) -> &str {
        "mock"
    }
}
