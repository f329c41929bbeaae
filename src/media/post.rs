//! Saved post representation.

use serde::{Deserialize, Deserializer, Serialize};

/// One saved post, as found in the `data` field of a listing child.
///
/// Only the fields needed for media extraction and naming are kept. Missing
/// or `null` scalar fields decode to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_video: bool,

    #[serde(default)]
    pub url_overridden_by_dest: Option<String>,

    #[serde(default)]
    pub media: Option<PostMedia>,

    #[serde(default)]
    pub preview: Option<PostPreview>,
}

/// The `media` block of a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostMedia {
    #[serde(default)]
    pub reddit_video: Option<RedditVideo>,
}

/// The `preview` block of a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPreview {
    #[serde(default)]
    pub reddit_video_preview: Option<RedditVideo>,
}

/// A Reddit-hosted video stream description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedditVideo {
    #[serde(default)]
    pub fallback_url: Option<String>,

    #[serde(default)]
    pub hls_url: Option<String>,
}

impl Post {
    /// Fallback URL of the Reddit-hosted video, if any.
    pub fn video_fallback_url(&self) -> Option<&str> {
        self.reddit_video()
            .and_then(|v| v.fallback_url.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// HLS playlist URL of the Reddit-hosted video, if any.
    pub fn video_hls_url(&self) -> Option<&str> {
        self.reddit_video()
            .and_then(|v| v.hls_url.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// Fallback URL of the preview video, if any.
    pub fn preview_fallback_url(&self) -> Option<&str> {
        self.preview
            .as_ref()
            .and_then(|p| p.reddit_video_preview.as_ref())
            .and_then(|v| v.fallback_url.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// The link target, ignoring empty strings.
    pub fn destination_url(&self) -> Option<&str> {
        self.url_overridden_by_dest
            .as_deref()
            .filter(|u| !u.is_empty())
    }

    fn reddit_video(&self) -> Option<&RedditVideo> {
        self.media.as_ref().and_then(|m| m.reddit_video.as_ref())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_minimal_post() {
        let post: Post = serde_json::from_value(json!({
            "id": "abc",
            "title": "Cat Pic",
            "url_overridden_by_dest": "https://i.example/cat.jpg"
        }))
        .unwrap();

        assert_eq!(post.id, "abc");
        assert_eq!(post.title, "Cat Pic");
        assert_eq!(post.domain, "");
        assert!(!post.is_video);
        assert_eq!(post.destination_url(), Some("https://i.example/cat.jpg"));
    }

    #[test]
    fn test_null_fields_decode_to_defaults() {
        let post: Post = serde_json::from_value(json!({
            "id": "abc",
            "title": null,
            "is_video": null,
            "media": null,
            "preview": null
        }))
        .unwrap();

        assert_eq!(post.title, "");
        assert!(!post.is_video);
        assert!(post.video_fallback_url().is_none());
        assert!(post.preview_fallback_url().is_none());
    }

    #[test]
    fn test_video_accessors() {
        let post: Post = serde_json::from_value(json!({
            "id": "v1",
            "is_video": true,
            "media": {
                "reddit_video": {
                    "fallback_url": "https://v.redd.it/xyz/DASH_720.mp4?source=fallback",
                    "hls_url": "https://v.redd.it/xyz/HLSPlaylist.m3u8"
                }
            },
            "preview": {
                "images": [],
                "reddit_video_preview": { "fallback_url": "" }
            }
        }))
        .unwrap();

        assert_eq!(
            post.video_fallback_url(),
            Some("https://v.redd.it/xyz/DASH_720.mp4?source=fallback")
        );
        assert_eq!(
            post.video_hls_url(),
            Some("https://v.redd.it/xyz/HLSPlaylist.m3u8")
        );
        assert!(post.preview_fallback_url().is_none());
    }
}
