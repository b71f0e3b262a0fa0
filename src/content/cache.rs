//! Content cache with in-flight load de-duplication.
//!
//! Each node id has at most one entry, tagged with the fingerprint it was
//! loaded for. Entries move `pending -> resolved | failed` and are replaced
//! rather than mutated once settled. All transitions go through one mutex so
//! "is it cached?" and "start loading" happen as a single step.
//!
//! Nothing expires on a timer. Entries leave the cache when a different
//! fingerprint supersedes them, on explicit eviction, or when the cache is
//! dropped.

use crate::content::Content;
use crate::error::LoadError;
use crate::types::{Fingerprint, NodeId};
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

pub type LoadResult = Result<Arc<Content>, LoadError>;

/// A load shared by every caller waiting on the same `(id, fingerprint)`
pub type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

#[derive(Clone)]
enum EntryState {
    Pending(SharedLoad),
    Resolved(Arc<Content>),
    Failed(LoadError),
}

struct CacheEntry {
    fingerprint: Fingerprint,
    generation: u64,
    state: EntryState,
}

/// Identifies one started load so its outcome is written back only to the
/// entry that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub id: NodeId,
    pub fingerprint: Fingerprint,
    generation: u64,
}

/// Outcome of [`ContentCache::lookup_or_begin`]
pub enum Lookup {
    /// Settled entry for the requested fingerprint
    Hit(LoadResult),
    /// Joined a load another caller started
    Joined(SharedLoad),
    /// No usable entry existed; this caller started the load
    Started(SharedLoad),
}

/// Observable state of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Absent,
    Pending,
    Resolved,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub pending: usize,
    pub hits: u64,
    pub joins: u64,
    pub loads_started: u64,
    pub superseded: u64,
    pub evictions: u64,
    /// Loads whose entry was evicted or superseded before they settled
    pub detached: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<NodeId, CacheEntry>,
    next_generation: u64,
    stats: CacheStats,
}

/// Owned cache instance. Construct one per resolver (or per test); there is
/// no process-wide cache.
#[derive(Default)]
pub struct ContentCache {
    inner: Mutex<Inner>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `(id, fingerprint)` and, if there is nothing usable, start a
    /// load with `begin` and record it as pending, all under one lock.
    ///
    /// `begin` runs while the lock is held: it must only create (and spawn)
    /// the load, never wait on it.
    pub fn lookup_or_begin<F>(&self, id: NodeId, fingerprint: &Fingerprint, begin: F) -> Lookup
    where
        F: FnOnce(LoadTicket) -> SharedLoad,
    {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(entry) = inner.entries.get(&id) {
            if entry.fingerprint == *fingerprint {
                let state = entry.state.clone();
                match state {
                    EntryState::Resolved(content) => {
                        inner.stats.hits += 1;
                        trace!(node = %id.short(), "Cache hit");
                        return Lookup::Hit(Ok(content));
                    }
                    EntryState::Failed(err) if !err.is_retryable() => {
                        inner.stats.hits += 1;
                        trace!(node = %id.short(), "Cache hit (terminal failure)");
                        return Lookup::Hit(Err(err));
                    }
                    EntryState::Pending(load) => {
                        inner.stats.joins += 1;
                        trace!(node = %id.short(), "Joined in-flight load");
                        return Lookup::Joined(load);
                    }
                    EntryState::Failed(_) => {
                        // Transient failure: eligible for a fresh load.
                    }
                }
            } else {
                inner.stats.superseded += 1;
                if matches!(entry.state, EntryState::Pending(_)) {
                    inner.stats.detached += 1;
                }
                debug!(
                    node = %id.short(),
                    old = %entry.fingerprint,
                    new = %fingerprint,
                    "Fingerprint changed, superseding cache entry"
                );
            }
        }

        inner.next_generation += 1;
        let ticket = LoadTicket {
            id,
            fingerprint: fingerprint.clone(),
            generation: inner.next_generation,
        };
        let generation = ticket.generation;
        let load = begin(ticket);
        inner.entries.insert(
            id,
            CacheEntry {
                fingerprint: fingerprint.clone(),
                generation,
                state: EntryState::Pending(load.clone()),
            },
        );
        inner.stats.loads_started += 1;
        Lookup::Started(load)
    }

    /// Record the outcome of a load. Ignored if the entry was evicted or
    /// superseded since the load started.
    pub fn settle(&self, ticket: &LoadTicket, result: &LoadResult) -> bool {
        let mut inner = self.inner.lock();
        match inner.entries.get_mut(&ticket.id) {
            Some(entry) if entry.generation == ticket.generation => {
                entry.state = match result {
                    Ok(content) => EntryState::Resolved(Arc::clone(content)),
                    Err(err) => EntryState::Failed(err.clone()),
                };
                true
            }
            _ => {
                trace!(node = %ticket.id.short(), "Load settled after detach");
                false
            }
        }
    }

    /// Settled value for `(id, fingerprint)` without starting a load.
    pub fn peek(&self, id: &NodeId, fingerprint: &Fingerprint) -> Option<LoadResult> {
        let inner = self.inner.lock();
        let entry = inner.entries.get(id)?;
        if entry.fingerprint != *fingerprint {
            return None;
        }
        match &entry.state {
            EntryState::Resolved(content) => Some(Ok(Arc::clone(content))),
            EntryState::Failed(err) => Some(Err(err.clone())),
            EntryState::Pending(_) => None,
        }
    }

    pub fn status(&self, id: &NodeId) -> EntryStatus {
        match self.inner.lock().entries.get(id).map(|e| &e.state) {
            None => EntryStatus::Absent,
            Some(EntryState::Pending(_)) => EntryStatus::Pending,
            Some(EntryState::Resolved(_)) => EntryStatus::Resolved,
            Some(EntryState::Failed(_)) => EntryStatus::Failed,
        }
    }

    /// Remove an entry. A pending load keeps running and its waiters still
    /// get its result, but it no longer backs the cache.
    pub fn evict(&self, id: &NodeId) -> bool {
        let mut inner = self.inner.lock();
        match inner.entries.remove(id) {
            Some(entry) => {
                inner.stats.evictions += 1;
                if matches!(entry.state, EntryState::Pending(_)) {
                    inner.stats.detached += 1;
                }
                debug!(node = %id.short(), "Evicted cache entry");
                true
            }
            None => false,
        }
    }

    pub fn evict_all(&self) -> usize {
        let mut inner = self.inner.lock();
        let removed = inner.entries.len();
        let pending = inner
            .entries
            .values()
            .filter(|e| matches!(e.state, EntryState::Pending(_)))
            .count();
        inner.entries.clear();
        inner.stats.evictions += removed as u64;
        inner.stats.detached += pending as u64;
        removed
    }

    /// Keep only entries for which `keep(id, fingerprint)` is true.
    pub fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&NodeId, &Fingerprint) -> bool,
    {
        let mut inner = self.inner.lock();
        let mut removed = 0u64;
        let mut detached = 0u64;
        inner.entries.retain(|id, entry| {
            let kept = keep(id, &entry.fingerprint);
            if !kept {
                removed += 1;
                if matches!(entry.state, EntryState::Pending(_)) {
                    detached += 1;
                }
            }
            kept
        });
        inner.stats.evictions += removed;
        inner.stats.detached += detached;
        removed as usize
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats;
        stats.entries = inner.entries.len();
        stats.pending = inner
            .entries
            .values()
            .filter(|e| matches!(e.state, EntryState::Pending(_)))
            .count();
        stats
    }
}
