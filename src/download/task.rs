//! Task planning: from posts to scheduled downloads.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::FilenameStyle;
use crate::dedup::ResumeLedger;
use crate::fs::plan_destination;
use crate::media::{extract, MediaCandidate, Post, SourceKind};

/// One candidate of one post, bound to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub post_id: String,
    pub candidate: MediaCandidate,
    pub destination: PathBuf,
    /// 1-based position of the candidate within its post.
    pub sequence_index: usize,
}

impl DownloadTask {
    /// Source URL of the task.
    pub fn url(&self) -> &str {
        &self.candidate.source_url
    }
}

/// Result of planning a run.
#[derive(Debug, Default)]
pub struct PlannedRun {
    pub tasks: Vec<DownloadTask>,
    pub posts_total: u64,
    /// Posts already in the ledger.
    pub posts_skipped: u64,
    /// Posts with no media candidate.
    pub posts_without_media: u64,
    /// Candidates dropped as unnameable or duplicated within the run.
    pub candidates_dropped: u64,
}

/// Build the task list for a run.
///
/// Runs single-threaded before any fetch. Posts already in the ledger are
/// skipped; every other post is marked processed once its candidates are
/// scheduled, whatever their eventual outcome.
pub fn plan_tasks(
    posts: &[Post],
    style: FilenameStyle,
    output_dir: &Path,
    ledger: &mut ResumeLedger,
) -> PlannedRun {
    let mut planned = PlannedRun {
        posts_total: posts.len() as u64,
        ..Default::default()
    };
    // Keyed by kind too: a RedGifs link that also ends in a media
    // extension is scheduled once per strategy.
    let mut scheduled: HashSet<(String, SourceKind)> = HashSet::new();

    for post in posts {
        if ledger.is_processed(&post.id) {
            tracing::debug!("Already processed post {}", post.id);
            planned.posts_skipped += 1;
            continue;
        }

        let candidates = extract(post);
        if candidates.is_empty() {
            planned.posts_without_media += 1;
        }

        let group_size = candidates.len();
        for (position, candidate) in candidates.into_iter().enumerate() {
            let index = position + 1;

            let key = (candidate.source_url.clone(), candidate.source_kind);
            if scheduled.contains(&key) {
                tracing::debug!("Duplicate URL in post {}: {}", post.id, candidate.source_url);
                planned.candidates_dropped += 1;
                continue;
            }

            let destination =
                match plan_destination(output_dir, post, &candidate, style, index, group_size) {
                    Ok(Some(path)) => path,
                    Ok(None) => {
                        tracing::warn!(
                            "Cannot name media for post {} ({}), skipping",
                            post.id,
                            candidate.source_url
                        );
                        planned.candidates_dropped += 1;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!("Skipping media for post {}: {}", post.id, e);
                        planned.candidates_dropped += 1;
                        continue;
                    }
                };

            scheduled.insert(key);
            planned.tasks.push(DownloadTask {
                post_id: post.id.clone(),
                candidate,
                destination,
                sequence_index: index,
            });
        }

        ledger.mark_processed(post.id.clone());
    }

    planned
}
