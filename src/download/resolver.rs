//! Per-source resolution and fetch.

use reqwest::Client;

use crate::api::RedGifsApi;
use crate::download::direct::fetch_to_file;
use crate::download::hosted::HostedVideoStrategy;
use crate::download::task::DownloadTask;
use crate::error::Result;
use crate::media::{MediaCandidate, SourceKind};

/// Where a candidate's bytes come from once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A plain fetchable URL.
    Url(String),
    /// Handed to the external downloader as-is.
    External(String),
}

/// Turns candidates into files on disk.
#[derive(Clone)]
pub struct Resolver {
    client: Client,
    redgifs: RedGifsApi,
    hosted: HostedVideoStrategy,
}

impl Resolver {
    pub fn new(client: Client, redgifs: RedGifsApi, hosted: HostedVideoStrategy) -> Self {
        Self {
            client,
            redgifs,
            hosted,
        }
    }

    /// Resolve a candidate to its final source.
    pub async fn resolve(&self, candidate: &MediaCandidate) -> Result<Resolved> {
        match candidate.source_kind {
            SourceKind::Direct => Ok(Resolved::Url(candidate.source_url.clone())),
            SourceKind::RedGifs => {
                let url = self.redgifs.resolve(&candidate.source_url).await?;
                tracing::debug!("Resolved {} to {}", candidate.source_url, url);
                Ok(Resolved::Url(url))
            }
            SourceKind::HostedVideo => Ok(Resolved::External(candidate.source_url.clone())),
        }
    }

    /// Resolve and fetch one task to its destination.
    ///
    /// `selector` is the hosted-video format position, kept by the caller
    /// across retries of the same task.
    pub async fn fetch(&self, task: &DownloadTask, selector: &mut usize) -> Result<()> {
        match self.resolve(&task.candidate).await? {
            Resolved::Url(url) => {
                let bytes = fetch_to_file(&self.client, &url, &task.destination).await?;
                tracing::debug!("Wrote {} bytes to {}", bytes, task.destination.display());
                Ok(())
            }
            Resolved::External(url) => {
                self.hosted
                    .download(&url, &task.destination, selector)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::hosted::tests::ScriptedDownloader;
    use crate::error::Error;
    use std::sync::Arc;

    fn resolver(api_base: &str) -> Resolver {
        let downloader = Arc::new(ScriptedDownloader::new(Vec::new()));
        Resolver::new(
            Client::new(),
            RedGifsApi::new(Client::new(), api_base),
            HostedVideoStrategy::new(downloader, vec!["best".into()]),
        )
    }

    #[tokio::test]
    async fn test_direct_is_identity() {
        let resolver = resolver("http://127.0.0.1:9");
        let candidate = MediaCandidate::new("https://i.example/cat.jpg", SourceKind::Direct);
        assert_eq!(
            resolver.resolve(&candidate).await.unwrap(),
            Resolved::Url("https://i.example/cat.jpg".into())
        );
    }

    #[tokio::test]
    async fn test_hosted_video_goes_external() {
        let resolver = resolver("http://127.0.0.1:9");
        let candidate = MediaCandidate::new("https://v.redd.it/xyz", SourceKind::HostedVideo);
        assert_eq!(
            resolver.resolve(&candidate).await.unwrap(),
            Resolved::External("https://v.redd.it/xyz".into())
        );
    }

    #[tokio::test]
    async fn test_redgifs_resolution_failure() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("GET", "/v2/auth/temporary")
            .with_status(500)
            .create_async()
            .await;

        let resolver = resolver(&server.url());
        let candidate =
            MediaCandidate::new("https://www.redgifs.com/watch/somegif", SourceKind::RedGifs);
        let err = resolver.resolve(&candidate).await.unwrap_err();

        assert!(matches!(err, Error::Resolution(_)));
        assert!(!err.is_retryable());
    }
}
