//! Authenticated saved-listing client.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tokio::time::sleep;

use crate::api::types::{child_id, ListingResponse};
use crate::error::{Error, Result};

/// Posts requested per listing page.
pub const PAGE_SIZE: usize = 25;

/// Consecutive pages without a new post id that end pagination.
pub const MAX_STALE_PAGES: usize = 3;

/// Client for a user's saved listing.
#[derive(Debug, Clone)]
pub struct RedditApi {
    client: Client,
    api_base: String,
    session_cookie: String,
    page_delay: Duration,
}

impl RedditApi {
    pub fn new(client: Client, api_base: impl Into<String>, session_cookie: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            session_cookie: session_cookie.into(),
            page_delay: Duration::from_secs(1),
        }
    }

    /// Set the base delay between pages. A random amount of up to half the
    /// delay is added to each wait.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Fetch every saved item of a user, following `after` cursors.
    ///
    /// Stops when a page has no cursor, or after three consecutive pages that
    /// only contain ids already seen.
    pub async fn fetch_saved(&self, username: &str) -> Result<Vec<Value>> {
        let username = username.trim_start_matches("u/");
        let mut children = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut stale_pages = 0;
        let mut after: Option<String> = None;
        let mut page_number = 0;

        loop {
            if page_number > 0 {
                sleep(self.jittered_delay()).await;
            }
            page_number += 1;

            let page = self.fetch_page(username, after.as_deref()).await?.data;

            let mut new_items = 0;
            for child in page.children {
                let id = match child_id(&child) {
                    Some(id) => id.to_string(),
                    None => continue,
                };
                if seen.insert(id) {
                    new_items += 1;
                    children.push(child);
                }
            }

            tracing::debug!(
                "Listing page {}: {} new items ({} total)",
                page_number,
                new_items,
                children.len()
            );

            if new_items == 0 {
                stale_pages += 1;
                if stale_pages >= MAX_STALE_PAGES {
                    tracing::info!(
                        "Stopping after {} pages without new items",
                        MAX_STALE_PAGES
                    );
                    break;
                }
            } else {
                stale_pages = 0;
            }

            match page.after {
                Some(cursor) if !cursor.is_empty() => after = Some(cursor),
                _ => break,
            }
        }

        tracing::info!("Fetched {} saved items for u/{}", children.len(), username);
        Ok(children)
    }

    /// Fetch a single listing page.
    async fn fetch_page(&self, username: &str, after: Option<&str>) -> Result<ListingResponse> {
        let url = format!("{}/user/{}/saved.json", self.api_base, username);
        tracing::debug!("GET {} (after={:?})", url, after);

        let limit = PAGE_SIZE.to_string();
        let mut request = self
            .client
            .get(&url)
            .query(&[("limit", limit.as_str()), ("raw_json", "1")])
            .header(header::COOKIE, format!("reddit_session={}", self.session_cookie));

        if let Some(cursor) = after {
            request = request.query(&[("after", cursor)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Listing(format!("Saved listing request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication(format!(
                "HTTP {} (is the session cookie still valid?)",
                status
            )));
        }
        if !status.is_success() {
            return Err(Error::Listing(format!(
                "Saved listing request failed: HTTP {}",
                status
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::Listing(format!(
                "Failed to parse listing page: {} - Response: {}",
                e,
                &text[..text.len().min(200)]
            ))
        })
    }

    fn jittered_delay(&self) -> Duration {
        let max_extra = (self.page_delay.as_millis() / 2) as u64;
        let extra = if max_extra > 0 {
            rand::thread_rng().gen_range(0..=max_extra)
        } else {
            0
        };
        self.page_delay + Duration::from_millis(extra)
    }
}
