//! Direct file fetching.

use std::path::Path;

use futures::StreamExt;
use reqwest::{Client, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::fs::temp_path;

/// Fetch a URL into `destination`.
///
/// The body is streamed to `{destination}.tmp` and renamed into place only
/// once fully read, so a failed transfer never leaves a file at the final
/// path. Returns the number of bytes written.
pub async fn fetch_to_file(client: &Client, url: &str, destination: &Path) -> Result<u64> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(Error::RateLimited);
    }
    if status != StatusCode::OK {
        return Err(Error::UnexpectedStatus(status));
    }

    let tmp = temp_path(destination);
    match stream_body(response, &tmp).await {
        Ok(written) => {
            tokio::fs::rename(&tmp, destination).await?;
            Ok(written)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(e)
        }
    }
}

async fn stream_body(response: reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_fetch_writes_file_atomically() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/cat.jpg")
            .with_status(200)
            .with_body(b"meow-bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cat.jpg");
        let written =
            assert_ok!(fetch_to_file(&Client::new(), &format!("{}/cat.jpg", server.url()), &dest).await);

        assert_eq!(written, 10);
        assert_eq!(std::fs::read(&dest).unwrap(), b"meow-bytes");
        assert!(!temp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_rate_limited_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/busy.jpg")
            .with_status(429)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("busy.jpg");
        let err =
            assert_err!(fetch_to_file(&Client::new(), &format!("{}/busy.jpg", server.url()), &dest).await);

        assert!(matches!(err, Error::RateLimited));
        assert!(err.is_retryable());
        assert!(!dest.exists());
        assert!(!temp_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_not_found_is_terminal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.jpg")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("gone.jpg");
        let err =
            assert_err!(fetch_to_file(&Client::new(), &format!("{}/gone.jpg", server.url()), &dest).await);

        assert!(matches!(err, Error::UnexpectedStatus(StatusCode::NOT_FOUND)));
        assert!(!err.is_retryable());
        assert!(!dest.exists());
    }
}
