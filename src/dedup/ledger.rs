//! Resume ledger: which posts earlier runs already scheduled.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::dedup::tracker::CompletedUrls;
use crate::error::Result;
use crate::fs::temp_path;

/// Hidden ledger file kept in the output directory.
pub const LEDGER_FILENAME: &str = ".processed_posts.json";

/// Persisted set of processed post ids plus the in-memory set of URLs
/// completed during this run.
///
/// Post ids are only touched during single-threaded planning; the URL set is
/// the part shared with concurrent tasks.
#[derive(Debug)]
pub struct ResumeLedger {
    path: PathBuf,
    processed: BTreeSet<String>,
    completed_urls: CompletedUrls,
}

impl ResumeLedger {
    /// Load the ledger from an output directory.
    ///
    /// A missing file yields an empty ledger. An unreadable or corrupt file is
    /// logged and also treated as empty; it is overwritten on the next persist.
    pub fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(LEDGER_FILENAME);

        let processed = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    tracing::warn!("Ignoring corrupt ledger {}: {}", path.display(), e);
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => {
                tracing::warn!("Could not read ledger {}: {}", path.display(), e);
                BTreeSet::new()
            }
        };

        tracing::debug!("Loaded {} processed post ids", processed.len());

        Self {
            path,
            processed,
            completed_urls: CompletedUrls::new(),
        }
    }

    /// Check if a post was processed by this or an earlier run.
    pub fn is_processed(&self, post_id: &str) -> bool {
        self.processed.contains(post_id)
    }

    /// Mark a post as processed.
    pub fn mark_processed(&mut self, post_id: impl Into<String>) {
        self.processed.insert(post_id.into());
    }

    /// Forget a post, so the next run schedules it again.
    pub fn unmark_processed(&mut self, post_id: &str) -> bool {
        self.processed.remove(post_id)
    }

    /// Forget every processed post.
    pub fn clear(&mut self) {
        self.processed.clear();
    }

    /// Number of processed posts.
    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    /// Handle to the URLs completed during this run.
    pub fn completed_urls(&self) -> CompletedUrls {
        self.completed_urls.clone()
    }

    /// Location of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full set of processed ids back to disk.
    pub fn persist(&self) -> Result<()> {
        let ids: Vec<&String> = self.processed.iter().collect();
        let content = serde_json::to_string_pretty(&ids)?;

        let tmp = temp_path(&self.path);
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            "Persisted {} processed post ids to {}",
            ids.len(),
            self.path.display()
        );
        Ok(())
    }
}
