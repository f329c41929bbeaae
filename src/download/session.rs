//! One download run over a list of posts.

use std::sync::Arc;

use reqwest::Client;

use crate::api::{client_from_config, RedGifsApi};
use crate::config::Config;
use crate::dedup::ResumeLedger;
use crate::download::hosted::{ExternalDownloader, HostedVideoStrategy, YtDlp};
use crate::download::resolver::Resolver;
use crate::download::retry::RetryPolicy;
use crate::download::scheduler::Scheduler;
use crate::download::state::{DownloadOutcome, RunSummary};
use crate::download::task::plan_tasks;
use crate::error::Result;
use crate::fs::{cleanup_incomplete_downloads, ensure_dir};
use crate::media::Post;
use crate::output::{NoopReporter, SharedProgressReporter};
use crate::shutdown::{SharedShutdown, ShutdownCoordinator};

/// Drives planning, scheduling and ledger persistence for one run.
pub struct DownloadSession {
    config: Config,
    client: Client,
    downloader: Arc<dyn ExternalDownloader>,
    reporter: SharedProgressReporter,
    shutdown: SharedShutdown,
    reset_ledger: bool,
}

impl DownloadSession {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            client: client_from_config(config)?,
            downloader: Arc::new(YtDlp::from_config(&config.hosted_video)),
            reporter: Arc::new(NoopReporter),
            shutdown: ShutdownCoordinator::shared(),
            reset_ledger: false,
        })
    }

    pub fn with_reporter(mut self, reporter: SharedProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_external_downloader(mut self, downloader: Arc<dyn ExternalDownloader>) -> Self {
        self.downloader = downloader;
        self
    }

    /// Forget every previously processed post before planning.
    pub fn with_reset_ledger(mut self, reset: bool) -> Self {
        self.reset_ledger = reset;
        self
    }

    /// Download the media of `posts`.
    ///
    /// Individual task failures never fail the run; only filesystem errors
    /// around the output directory and ledger do.
    pub async fn run(&self, mut posts: Vec<Post>) -> Result<RunSummary> {
        let options = &self.config.options;
        let output_dir = options.output_directory.as_path();

        ensure_dir(output_dir)?;

        if options.cleanup_incomplete {
            match cleanup_incomplete_downloads(output_dir) {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Removed {} incomplete downloads", removed),
                Err(e) => tracing::warn!("Cleanup of {} failed: {}", output_dir.display(), e),
            }
        }

        let mut ledger = ResumeLedger::load(output_dir);
        if self.reset_ledger && !ledger.is_empty() {
            tracing::info!("Resetting ledger ({} posts)", ledger.len());
            ledger.clear();
        }

        if options.reverse_order {
            posts.reverse();
        }

        // Single-threaded planning; the only phase that touches post ids
        let planned = plan_tasks(&posts, options.filename_style, output_dir, &mut ledger);
        tracing::info!(
            "{} posts: {} already processed, {} without media, {} downloads scheduled",
            planned.posts_total,
            planned.posts_skipped,
            planned.posts_without_media,
            planned.tasks.len()
        );

        let resolver = Resolver::new(
            self.client.clone(),
            RedGifsApi::new(self.client.clone(), &self.config.redgifs.api_base),
            HostedVideoStrategy::new(
                self.downloader.clone(),
                self.config.hosted_video.formats.clone(),
            ),
        );
        let scheduler = Scheduler::new(resolver, ledger.completed_urls(), options.concurrency)
            .with_retry_policy(RetryPolicy::from_config(&self.config))
            .with_reporter(self.reporter.clone())
            .with_shutdown(self.shutdown.clone());

        let outcomes = scheduler.run(&planned.tasks).await;

        let mut summary = RunSummary {
            posts_total: planned.posts_total,
            posts_skipped: planned.posts_skipped,
            posts_without_media: planned.posts_without_media,
            candidates_dropped: planned.candidates_dropped,
            ..Default::default()
        };

        for (task, outcome) in planned.tasks.iter().zip(outcomes) {
            summary.record(outcome);
            // Never started: retry the whole post next run
            if outcome == DownloadOutcome::Cancelled {
                ledger.unmark_processed(&task.post_id);
            }
        }

        ledger.persist()?;
        tracing::debug!("Ledger saved to {}", ledger.path().display());

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::parse::parse_listing_str;
    use std::path::Path;

    fn config_for(output: &Path) -> Config {
        let mut config = Config::default();
        config.options.output_directory = output.to_path_buf();
        config.options.base_delay_ms = 10;
        config.options.jitter_ms = 0;
        config
    }

    fn cat_pic_listing(base: &str) -> Vec<Post> {
        let json = format!(
            r#"{{"data":{{"children":[{{"data":{{"id":"abc","title":"Cat Pic","url_overridden_by_dest":"{}/cat.jpg"}}}}]}}}}"#,
            base
        );
        parse_listing_str(&json).unwrap()
    }

    #[tokio::test]
    async fn test_cat_pic_scenario() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cat.jpg")
            .with_status(200)
            .with_body("cat-bytes")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = DownloadSession::new(&config_for(dir.path())).unwrap();
        let summary = session.run(cat_pic_listing(&server.url())).await.unwrap();

        assert_eq!(summary.downloaded, 1);
        assert_eq!(summary.total_tasks(), 1);
        assert_eq!(
            std::fs::read(dir.path().join("Cat_Pic --- abc.jpg")).unwrap(),
            b"cat-bytes"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_second_run_fetches_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cat.jpg")
            .with_status(200)
            .with_body("cat-bytes")
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());

        let first = DownloadSession::new(&config)
            .unwrap()
            .run(cat_pic_listing(&server.url()))
            .await
            .unwrap();
        let second = DownloadSession::new(&config)
            .unwrap()
            .run(cat_pic_listing(&server.url()))
            .await
            .unwrap();

        assert_eq!(first.downloaded, 1);
        assert_eq!(second.total_tasks(), 0);
        assert_eq!(second.posts_skipped, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_redgifs_token_failure_still_marks_post() {
        let mut server = mockito::Server::new_async().await;
        let token = server
            .mock("GET", "/v2/auth/temporary")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.redgifs.api_base = server.url();

        let posts = parse_listing_str(
            r#"[{"data":{"id":"rg1","title":"Gif","domain":"redgifs.com",
                "url_overridden_by_dest":"https://www.redgifs.com/watch/happycat"}}]"#,
        )
        .unwrap();

        let summary = DownloadSession::new(&config)
            .unwrap()
            .run(posts)
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert!(!dir.path().join("Gif --- rg1.mp4").exists());
        assert!(ResumeLedger::load(dir.path()).is_processed("rg1"));
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_cancelled_posts_are_unmarked() {
        let dir = tempfile::tempdir().unwrap();
        let shutdown = ShutdownCoordinator::shared();
        shutdown.request_shutdown();

        let session = DownloadSession::new(&config_for(dir.path()))
            .unwrap()
            .with_shutdown(shutdown);
        let summary = session
            .run(cat_pic_listing("http://127.0.0.1:9"))
            .await
            .unwrap();

        assert_eq!(summary.cancelled, 1);
        let ledger = ResumeLedger::load(dir.path());
        assert!(!ledger.is_processed("abc"));
        assert!(ledger.path().exists());
    }

    #[tokio::test]
    async fn test_reset_ledger_replans_posts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cat_Pic --- abc.jpg"), b"kept").unwrap();
        let mut ledger = ResumeLedger::load(dir.path());
        ledger.mark_processed("abc");
        ledger.persist().unwrap();

        let summary = DownloadSession::new(&config_for(dir.path()))
            .unwrap()
            .with_reset_ledger(true)
            .run(cat_pic_listing("http://127.0.0.1:9"))
            .await
            .unwrap();

        assert_eq!(summary.posts_skipped, 0);
        assert_eq!(summary.already_present, 1);
    }

    #[tokio::test]
    async fn test_stale_hosted_video_fails_when_every_format_fails() {
        use crate::download::hosted::tests::ScriptedDownloader;
        use crate::download::hosted::ExternalOutcome;

        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("Clip --- v1.mp4");
        std::fs::write(&stale, vec![0u8; 100]).unwrap();

        let unavailable = || (ExternalOutcome::FormatUnavailable("nope".into()), false);
        let downloader = Arc::new(ScriptedDownloader::new(vec![
            unavailable(),
            unavailable(),
            unavailable(),
            unavailable(),
        ]));
        let posts = parse_listing_str(
            r#"[{"data":{"id":"v1","title":"Clip",
                "url_overridden_by_dest":"https://v.redd.it/v1clip/DASH_720.mp4"}}]"#,
        )
        .unwrap();

        let summary = DownloadSession::new(&config_for(dir.path()))
            .unwrap()
            .with_external_downloader(downloader.clone())
            .run(posts)
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.downloaded, 0);
        assert_eq!(summary.already_present, 0);
        assert!(!stale.exists());
        assert_eq!(downloader.calls.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_redgifs_failure_falls_back_to_direct_link() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("GET", "/v2/auth/temporary")
            .with_status(500)
            .create_async()
            .await;
        let direct = server
            .mock("GET", "/Abc.mp4")
            .with_status(200)
            .with_body(vec![9u8; 64])
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.redgifs.api_base = server.url();

        let json = format!(
            r#"[{{"data":{{"id":"rg2","title":"Gif","domain":"redgifs.com",
                "url_overridden_by_dest":"{}/Abc.mp4"}}}}]"#,
            server.url()
        );
        let posts = parse_listing_str(&json).unwrap();

        let summary = DownloadSession::new(&config)
            .unwrap()
            .run(posts)
            .await
            .unwrap();

        assert_eq!(summary.total_tasks(), 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.downloaded, 1);
        assert!(!dir.path().join("Gif --- rg2_1.mp4").exists());
        assert_eq!(
            std::fs::read(dir.path().join("Gif --- rg2_2.mp4")).unwrap(),
            vec![9u8; 64]
        );
        direct.assert_async().await;
    }
}
