//! RedGifs token-exchange client.

use std::collections::HashMap;

use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::api::types::{GifResponse, TokenResponse};
use crate::error::{Error, Result};

/// Qualities tried in order when picking a media URL.
pub const QUALITY_PREFERENCE: [&str; 4] = ["hd", "gif", "sd", "thumbnail"];

/// Client for the RedGifs v2 API.
#[derive(Debug, Clone)]
pub struct RedGifsApi {
    client: Client,
    api_base: String,
}

impl RedGifsApi {
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a RedGifs page URL to a fetchable media URL.
    ///
    /// Any failure here is terminal for the candidate.
    pub async fn resolve(&self, page_url: &str) -> Result<String> {
        let gif_id = extract_gif_id(page_url).ok_or_else(|| {
            Error::Resolution(format!("No RedGifs id in URL: {}", page_url))
        })?;

        let token = self.temporary_token().await?;
        self.media_url(&gif_id, &token).await
    }

    /// Obtain a short-lived anonymous bearer token.
    pub async fn temporary_token(&self) -> Result<String> {
        let url = format!("{}/v2/auth/temporary", self.api_base);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Resolution(format!("RedGifs token request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Resolution(format!(
                "Failed to get RedGifs token: HTTP {}",
                status
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Resolution(format!("Invalid RedGifs token response: {}", e)))?;

        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Resolution("RedGifs token response had no token".into()))
    }

    /// Look up a gif and pick the preferred available quality.
    pub async fn media_url(&self, gif_id: &str, token: &str) -> Result<String> {
        let url = format!("{}/v2/gifs/{}", self.api_base, gif_id);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| Error::Resolution(format!("RedGifs lookup failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Resolution(format!(
                "Failed to get RedGifs video URL for {}: HTTP {}",
                gif_id, status
            )));
        }

        let body: GifResponse = response
            .json()
            .await
            .map_err(|e| Error::Resolution(format!("Invalid RedGifs gif response: {}", e)))?;

        select_quality(&body.gif.urls)
            .map(str::to_string)
            .ok_or_else(|| Error::Resolution(format!("No media URLs for RedGifs id {}", gif_id)))
    }
}

/// Extract the gif id from a RedGifs URL.
///
/// Handles `/watch/{id}`, `/ifr/{id}` and direct media URLs; the extension
/// and query string are dropped.
pub fn extract_gif_id(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let path = path.trim_end_matches('/');
    let path = path
        .strip_prefix("/watch/")
        .or_else(|| path.strip_prefix("/ifr/"))
        .unwrap_or(path);

    let segment = path.rsplit('/').next().unwrap_or_default();
    let id = segment.split('.').next().unwrap_or_default();

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// First non-empty URL in quality preference order.
pub fn select_quality(urls: &HashMap<String, Option<String>>) -> Option<&str> {
    QUALITY_PREFERENCE.iter().find_map(|quality| {
        urls.get(*quality)
            .and_then(|u| u.as_deref())
            .filter(|u| !u.is_empty())
    })
}
