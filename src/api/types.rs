//! API response type definitions.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// RedGifs anonymous token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// RedGifs gif lookup response.
#[derive(Debug, Deserialize)]
pub struct GifResponse {
    pub gif: GifDetails,
}

/// Details of a single RedGifs item.
#[derive(Debug, Deserialize)]
pub struct GifDetails {
    /// Media URLs keyed by quality name (`hd`, `sd`, `gif`, ...).
    #[serde(default)]
    pub urls: HashMap<String, Option<String>>,
}

/// One page of a Reddit listing.
#[derive(Debug, Deserialize)]
pub struct ListingResponse {
    pub data: ListingData,
}

/// Body of a listing page. Children are kept as raw JSON so the saved
/// snapshot matches what Reddit returned.
#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Value>,

    #[serde(default)]
    pub after: Option<String>,
}

/// Id of a listing child, if present.
pub fn child_id(child: &Value) -> Option<&str> {
    child
        .get("data")
        .and_then(|d| d.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}
