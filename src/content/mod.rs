//! Lazy content resolution
//!
//! [`resolver::ContentResolver`] turns a node id into its document body,
//! loading it through a [`source::ContentSource`] at most once per
//! fingerprint and memoizing the outcome in a [`cache::ContentCache`].

pub mod cache;
pub mod resolver;
pub mod source;

use crate::types::{Fingerprint, NodeId};

/// A loaded document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub id: NodeId,
    pub path: String,
    pub fingerprint: Fingerprint,
    pub text: String,
}

pub use cache::{CacheStats, ContentCache, EntryStatus};
pub use resolver::{ContentResolver, ResolverConfig};
pub use source::{ContentSource, FsContentSource, MockContentSource, MockResponse};
