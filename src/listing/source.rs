//! Where the saved listing comes from.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::{client_from_config, RedditApi};
use crate::config::{clean_username, Config};
use crate::error::{Error, Result};
use crate::listing::parse::parse_listing;
use crate::media::Post;

/// A producer of the raw listing document.
///
/// Every source returns the same shape: an object with `data.children`, or a
/// bare list of children.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Human-readable description for log messages.
    fn describe(&self) -> String;

    /// Produce the raw listing document.
    async fn fetch(&self) -> Result<Value>;
}

/// A listing previously saved to disk.
#[derive(Debug, Clone)]
pub struct FileListing {
    path: PathBuf,
}

impl FileListing {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for FileListing {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<Value> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Listing(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Error::Listing(format!("{} is not valid JSON: {}", self.path.display(), e))
        })
    }
}

/// The saved listing of a logged-in user, fetched from Reddit.
///
/// The fetched listing is also written to `snapshot_path` so later runs can
/// use it as a file source.
#[derive(Debug, Clone)]
pub struct RemoteListing {
    api: RedditApi,
    username: String,
    snapshot_path: PathBuf,
}

impl RemoteListing {
    pub fn new(api: RedditApi, username: impl Into<String>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            api,
            username: username.into(),
            snapshot_path: snapshot_path.into(),
        }
    }
}

#[async_trait]
impl ListingSource for RemoteListing {
    fn describe(&self) -> String {
        format!("saved posts of u/{}", self.username)
    }

    async fn fetch(&self) -> Result<Value> {
        let children = self.api.fetch_saved(&self.username).await?;
        let document = json!({
            "kind": "Listing",
            "data": { "children": children }
        });

        let content = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(&self.snapshot_path, content).await?;
        tracing::info!("Saved listing to {}", self.snapshot_path.display());

        Ok(document)
    }
}

/// Build the listing source selected by the configuration.
pub fn source_from_config(config: &Config) -> Result<Box<dyn ListingSource>> {
    if let Some(path) = &config.input_file {
        return Ok(Box::new(FileListing::new(path)));
    }

    let username = config
        .account
        .username
        .as_deref()
        .map(clean_username)
        .ok_or_else(|| Error::MissingConfig("input file or username".into()))?;
    let cookie = config
        .account
        .session_cookie
        .clone()
        .ok_or_else(|| Error::MissingConfig("session cookie".into()))?;

    let api = RedditApi::new(client_from_config(config)?, &config.listing.api_base, cookie)
        .with_page_delay(Duration::from_millis(config.listing.page_delay_ms));

    Ok(Box::new(RemoteListing::new(
        api,
        username,
        &config.listing.snapshot_file,
    )))
}

/// Fetch and parse posts from a source.
pub async fn load_posts(source: &dyn ListingSource) -> Result<Vec<Post>> {
    tracing::info!("Reading listing from {}", source.describe());
    let document = source.fetch().await?;
    let posts = parse_listing(document)?;
    tracing::info!("Found {} posts", posts.len());
    Ok(posts)
}
