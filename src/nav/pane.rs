//! Document pane state.

use crate::content::cache::LoadResult;
use crate::content::{Content, ContentResolver};
use crate::error::LoadError;
use crate::types::NodeId;
use std::sync::Arc;
use tracing::warn;

/// What the reading pane shows.
///
/// A failed load never blanks the pane: the last good document stays
/// visible and the error is shown next to it.
#[derive(Debug, Clone, Default)]
pub struct DocumentPane {
    pub current: Option<Arc<Content>>,
    pub error: Option<LoadError>,
}

impl DocumentPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, result: LoadResult) {
        match result {
            Ok(content) => {
                self.current = Some(content);
                self.error = None;
            }
            Err(err) => {
                warn!(error = %err, "Document load failed, keeping previous content");
                self.error = Some(err);
            }
        }
    }

    /// Resolve `id` and apply the outcome.
    pub async fn show(&mut self, resolver: &ContentResolver, id: &NodeId) {
        let result = resolver.resolve(id).await;
        self.apply(result);
    }

    pub fn text(&self) -> Option<&str> {
        self.current.as_deref().map(|c| c.text.as_str())
    }
}
