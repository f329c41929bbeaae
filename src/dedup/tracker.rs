//! Completed-URL tracking shared between concurrent download tasks.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Set of source URLs completed during this run.
///
/// Cloning yields another handle to the same set, so a URL marked by one
/// task is visible to every task that checks afterwards.
#[derive(Debug, Clone, Default)]
pub struct CompletedUrls {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl CompletedUrls {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a URL has already been completed.
    pub async fn contains(&self, url: &str) -> bool {
        self.inner.read().await.contains(url)
    }

    /// Mark a URL as completed. Returns false if it already was.
    pub async fn mark(&self, url: impl Into<String>) -> bool {
        self.inner.write().await.insert(url.into())
    }

    /// Number of completed URLs.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
