//! Hosted-video downloads through an external multi-format downloader.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::HostedVideoConfig;
use crate::error::{Error, Result};
use crate::fs::has_valid_file;

/// What the external downloader reported for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalOutcome {
    /// The tool exited successfully.
    Finished,
    /// The requested format selector matched nothing.
    FormatUnavailable(String),
    /// The host rejected the request with a rate limit.
    RateLimited,
    /// Any other failure.
    Failed(String),
}

/// An external program able to download a hosted video in a given format.
#[async_trait]
pub trait ExternalDownloader: Send + Sync {
    /// Human-readable name of the downloader.
    fn name(&self) -> &str;

    /// Download `url` to `destination` using `format`.
    ///
    /// `Err` is reserved for problems that make every format pointless, such
    /// as the program not being installed.
    async fn download(&self, url: &str, destination: &Path, format: &str)
        -> Result<ExternalOutcome>;
}

/// `yt-dlp` (or a compatible fork) invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &HostedVideoConfig) -> Self {
        Self::new(&config.program, Duration::from_secs(config.timeout_secs))
    }

    /// Check that the program can be run.
    pub async fn is_available(&self) -> bool {
        match Command::new(&self.program).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                tracing::debug!("{} is available, version: {}", self.program, version.trim());
                true
            }
            Ok(_) => {
                tracing::warn!("{} --version failed", self.program);
                false
            }
            Err(e) => {
                tracing::warn!("{} not found: {}", self.program, e);
                false
            }
        }
    }
}

#[async_trait]
impl ExternalDownloader for YtDlp {
    fn name(&self) -> &str {
        &self.program
    }

    async fn download(
        &self,
        url: &str,
        destination: &Path,
        format: &str,
    ) -> Result<ExternalOutcome> {
        // yt-dlp treats the output path as a template
        let output_template = destination.to_string_lossy().replace('%', "%%");

        let child = Command::new(&self.program)
            .args(["--no-playlist", "--no-progress", "--no-warnings", "--quiet", "--force-overwrites"])
            .arg("--format")
            .arg(format)
            .arg("--merge-output-format")
            .arg("mp4")
            .arg("--output")
            .arg(&output_template)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ExternalToolNotFound(self.program.clone()));
            }
            Ok(Err(e)) => {
                return Err(Error::ExternalTool(format!(
                    "Failed to run {}: {}",
                    self.program, e
                )));
            }
            Err(_) => {
                return Ok(ExternalOutcome::Failed(format!(
                    "timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if output.status.success() {
            return Ok(ExternalOutcome::Finished);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(classify_failure(&stderr))
    }
}

/// Classify an external downloader's error output.
pub fn classify_failure(stderr: &str) -> ExternalOutcome {
    let lower = stderr.to_lowercase();
    let reason = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("exited with an error")
        .trim()
        .to_string();

    if lower.contains("http error 429") || lower.contains("too many requests") {
        ExternalOutcome::RateLimited
    } else if lower.contains("requested format is not available")
        || lower.contains("format not available")
    {
        ExternalOutcome::FormatUnavailable(reason)
    } else {
        ExternalOutcome::Failed(reason)
    }
}

/// Size below which a hosted video file is treated as truncated.
pub const HOSTED_VIDEO_MIN_BYTES: u64 = 1024;

/// Remove a file left at `path` by an earlier run or attempt.
async fn remove_leftover(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!("Removed leftover {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Walks an ordered list of format selectors for one hosted video.
#[derive(Clone)]
pub struct HostedVideoStrategy {
    downloader: Arc<dyn ExternalDownloader>,
    formats: Vec<String>,
}

impl HostedVideoStrategy {
    pub fn new(downloader: Arc<dyn ExternalDownloader>, formats: Vec<String>) -> Self {
        let formats = formats
            .into_iter()
            .filter(|f| !f.trim().is_empty())
            .collect();
        Self {
            downloader,
            formats,
        }
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// Download a hosted video, starting at selector `*selector`.
    ///
    /// Unavailable formats and other failures advance the selector. A rate
    /// limit returns [`Error::RateLimited`] with the selector left in place,
    /// so a retry resumes at the same format. Success is judged only by a
    /// file of at least [`HOSTED_VIDEO_MIN_BYTES`] written by the attempt,
    /// never by the tool's exit status. Whatever sat at `destination` before
    /// an attempt is removed first.
    pub async fn download(&self, url: &str, destination: &Path, selector: &mut usize) -> Result<()> {
        let mut last_failure = ExternalOutcome::Failed("no format selectors configured".into());

        while let Some(format) = self.formats.get(*selector) {
            remove_leftover(destination).await?;
            let outcome = self.downloader.download(url, destination, format).await?;

            if has_valid_file(destination, HOSTED_VIDEO_MIN_BYTES).await {
                return Ok(());
            }

            match outcome {
                ExternalOutcome::RateLimited => return Err(Error::RateLimited),
                ExternalOutcome::Finished => {
                    tracing::debug!("{} produced no usable file with format {}", self.downloader.name(), format);
                    last_failure = ExternalOutcome::Failed(format!("no output for format {}", format));
                }
                other => {
                    tracing::debug!("Format {} failed for {}: {:?}", format, url, other);
                    last_failure = other;
                }
            }

            *selector += 1;
        }

        remove_leftover(destination).await?;

        Err(match last_failure {
            ExternalOutcome::FormatUnavailable(reason) => Error::FormatUnavailable(reason),
            ExternalOutcome::Failed(reason) => Error::ExternalTool(reason),
            ExternalOutcome::Finished | ExternalOutcome::RateLimited => {
                Error::ExternalTool("no format produced a file".into())
            }
        })
    }
}
