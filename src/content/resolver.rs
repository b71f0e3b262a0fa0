//! Content resolver: node id in, document body out.
//!
//! Loads run on spawned tasks, so a caller dropping its `resolve` future
//! never cancels a load other callers may be waiting on. Every attempt has a
//! timeout; transient failures are retried with exponential backoff before
//! the failure is surfaced.

use crate::content::cache::{ContentCache, LoadResult, LoadTicket, Lookup, SharedLoad};
use crate::content::source::ContentSource;
use crate::content::Content;
use crate::error::{LoadError, SourceError};
use crate::manifest::Manifest;
use crate::types::{Fingerprint, NodeId};
use futures::FutureExt;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Attempts per load, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds); doubles per retry
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Upper bound for the retry delay (milliseconds)
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    /// Timeout for a single fetch attempt (milliseconds)
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2_000
}

fn default_load_timeout_ms() -> u64 {
    10_000
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            load_timeout_ms: default_load_timeout_ms(),
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.load_timeout_ms == 0 {
            return Err("load_timeout_ms must be greater than 0".to_string());
        }
        if self.retry_max_delay_ms < self.retry_base_delay_ms {
            return Err("retry_max_delay_ms must be >= retry_base_delay_ms".to_string());
        }
        Ok(())
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        let delay = self
            .retry_base_delay_ms
            .saturating_mul(factor)
            .min(self.retry_max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Resolves node ids to document bodies through an owned cache
pub struct ContentResolver {
    manifest: RwLock<Arc<Manifest>>,
    cache: Arc<ContentCache>,
    source: Arc<dyn ContentSource>,
    config: ResolverConfig,
}

impl ContentResolver {
    pub fn new(
        manifest: Arc<Manifest>,
        cache: Arc<ContentCache>,
        source: Arc<dyn ContentSource>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            manifest: RwLock::new(manifest),
            cache,
            source,
            config,
        }
    }

    pub fn manifest(&self) -> Arc<Manifest> {
        Arc::clone(&self.manifest.read())
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Swap in a rebuilt manifest.
    ///
    /// Entries for nodes that disappeared or whose fingerprint changed are
    /// dropped right away; anything else would be superseded on its next
    /// resolve anyway.
    pub fn replace_manifest(&self, manifest: Arc<Manifest>) -> usize {
        let dropped = self.cache.retain(|id, fingerprint| {
            manifest
                .get(id)
                .map_or(false, |node| node.is_document() && node.fingerprint() == *fingerprint)
        });
        *self.manifest.write() = manifest;
        info!(dropped, "Manifest replaced");
        dropped
    }

    /// Resolve a document body.
    ///
    /// Returns without waiting when the cache already holds a settled entry
    /// for the node's current fingerprint.
    pub async fn resolve(&self, id: &NodeId) -> LoadResult {
        let (location, fingerprint) = {
            let manifest = self.manifest.read();
            let node = manifest.get(id).ok_or(LoadError::UnknownNode(*id))?;
            if !node.is_document() {
                return Err(LoadError::NotADocument(*id));
            }
            let location = Location {
                path: node.path.clone(),
                source_path: node.source_path().to_string(),
            };
            (location, node.fingerprint())
        };

        let lookup = self.cache.lookup_or_begin(*id, &fingerprint, |ticket| {
            self.spawn_load(ticket, location)
        });

        match lookup {
            Lookup::Hit(result) => result,
            Lookup::Joined(load) | Lookup::Started(load) => load.await,
        }
    }

    /// Resolve by normalized manifest path.
    pub async fn resolve_path(&self, path: &str) -> LoadResult {
        let id = self
            .manifest
            .read()
            .get_by_path(path)
            .map(|n| n.id)
            .ok_or_else(|| LoadError::NotFound(path.to_string()))?;
        self.resolve(&id).await
    }

    /// Drop the cache entry for `id`. An in-flight load is detached, not
    /// cancelled.
    pub fn evict(&self, id: &NodeId) -> bool {
        self.cache.evict(id)
    }

    fn spawn_load(&self, ticket: LoadTicket, location: Location) -> SharedLoad {
        let cache = Arc::clone(&self.cache);
        let source = Arc::clone(&self.source);
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            let result = load_with_retry(source.as_ref(), &config, &ticket, &location).await;
            cache.settle(&ticket, &result);
            result
        });

        handle
            .map(|joined| {
                joined.unwrap_or_else(|e| Err(LoadError::TransientIo(format!("load task failed: {}", e))))
            })
            .boxed()
            .shared()
    }
}

/// Where a document lives: its manifest path and the path the source reads.
struct Location {
    path: String,
    source_path: String,
}

async fn load_with_retry(
    source: &dyn ContentSource,
    config: &ResolverConfig,
    ticket: &LoadTicket,
    location: &Location,
) -> LoadResult {
    let path = location.path.as_str();
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let result = load_once(source, config, ticket.id, &ticket.fingerprint, location).await;
        match result {
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let delay = config.backoff(attempt);
                warn!(
                    path,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient load failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(path, attempt, error = %err, "Load failed");
                return Err(err);
            }
            Ok(content) => {
                debug!(path, attempt, bytes = content.text.len(), "Loaded document");
                return Ok(content);
            }
        }
    }
}

async fn load_once(
    source: &dyn ContentSource,
    config: &ResolverConfig,
    id: NodeId,
    fingerprint: &Fingerprint,
    location: &Location,
) -> LoadResult {
    let path = location.path.as_str();
    let fetched =
        tokio::time::timeout(config.load_timeout(), source.fetch(&location.source_path)).await;
    let bytes = match fetched {
        Err(_) => {
            return Err(LoadError::TransientIo(format!(
                "{} timed out after {}ms",
                path, config.load_timeout_ms
            )))
        }
        Ok(Err(SourceError::NotFound(_))) => return Err(LoadError::NotFound(path.to_string())),
        Ok(Err(SourceError::Transient(msg))) => return Err(LoadError::TransientIo(msg)),
        Ok(Ok(bytes)) => bytes,
    };
    let text = String::from_utf8(bytes).map_err(|e| LoadError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Arc::new(Content {
        id,
        path: path.to_string(),
        fingerprint: fingerprint.clone(),
        text,
    }))
}
