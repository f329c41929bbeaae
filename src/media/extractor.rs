//! Media URL extraction from saved posts.

use std::fmt;

use crate::fs::naming::url_extension;
use crate::media::post::Post;

/// Domain of posts whose link points at RedGifs.
pub const REDGIFS_DOMAIN: &str = "redgifs.com";

/// Substring identifying Reddit-hosted video links.
pub const HOSTED_VIDEO_MARKER: &str = "v.redd.it";

/// Extensions downloadable as-is.
pub const DIRECT_MEDIA_EXTENSIONS: &[&str] =
    &[".jpg", ".jpeg", ".png", ".gif", ".mp4", ".webm", ".gifv"];

/// Where a candidate URL comes from, which decides how it is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// The URL is the file.
    Direct,
    /// A RedGifs page, resolved through the RedGifs API.
    RedGifs,
    /// A Reddit-hosted video, handed to the external downloader.
    HostedVideo,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Direct => write!(f, "direct"),
            SourceKind::RedGifs => write!(f, "redgifs"),
            SourceKind::HostedVideo => write!(f, "hosted video"),
        }
    }
}

/// A media URL found in a post, not yet resolved to a byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCandidate {
    pub source_url: String,
    pub source_kind: SourceKind,
}

impl MediaCandidate {
    pub fn new(source_url: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            source_url: source_url.into(),
            source_kind,
        }
    }
}

/// Whether a URL's path ends in a directly downloadable media extension.
pub fn has_direct_media_extension(url: &str) -> bool {
    url_extension(url)
        .map(|ext| DIRECT_MEDIA_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Extract candidate media URLs from a post, in priority order.
///
/// Each rule appends independently. The same URL may appear twice; duplicates
/// are dropped when tasks are scheduled, not here.
pub fn extract(post: &Post) -> Vec<MediaCandidate> {
    let mut candidates = Vec::new();
    let destination = post.destination_url();

    // RedGifs links
    if post.domain == REDGIFS_DOMAIN {
        if let Some(url) = destination {
            tracing::debug!("RedGifs media: {}", post.title);
            candidates.push(MediaCandidate::new(url, SourceKind::RedGifs));
        }
    }

    // Reddit-hosted video, HLS only when there is no fallback
    if post.is_video {
        if let Some(url) = post.video_fallback_url().or_else(|| post.video_hls_url()) {
            tracing::debug!("Reddit video: {}", post.title);
            candidates.push(MediaCandidate::new(url, SourceKind::HostedVideo));
        }
    }

    // Preview video, only as a last resort
    if candidates.is_empty() {
        if let Some(url) = post.preview_fallback_url() {
            tracing::debug!("Preview video: {}", post.title);
            candidates.push(MediaCandidate::new(url, SourceKind::HostedVideo));
        }
    }

    match destination {
        Some(url) if url.contains(HOSTED_VIDEO_MARKER) => {
            tracing::debug!("Hosted video link: {}", post.title);
            candidates.push(MediaCandidate::new(url, SourceKind::HostedVideo));
        }
        Some(url) if has_direct_media_extension(url) => {
            tracing::debug!("Direct media: {}", post.title);
            candidates.push(MediaCandidate::new(url, SourceKind::Direct));
        }
        _ => {}
    }

    if candidates.is_empty() {
        tracing::debug!("No media in post {} ({})", post.id, post.title);
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::post::{PostMedia, PostPreview, RedditVideo};

    fn post_with_url(domain: &str, url: &str) -> Post {
        Post {
            id: "abc".into(),
            title: "Title".into(),
            domain: domain.into(),
            url_overridden_by_dest: Some(url.into()),
            ..Default::default()
        }
    }

    fn video(fallback: Option<&str>, hls: Option<&str>) -> RedditVideo {
        RedditVideo {
            fallback_url: fallback.map(String::from),
            hls_url: hls.map(String::from),
        }
    }

    #[test]
    fn test_self_post_has_no_candidates() {
        let post = Post {
            id: "self1".into(),
            title: "Just text".into(),
            domain: "self.rust".into(),
            ..Default::default()
        };
        assert!(extract(&post).is_empty());
    }

    #[test]
    fn test_unsupported_link_has_no_candidates() {
        let post = post_with_url("example.com", "https://example.com/article");
        assert!(extract(&post).is_empty());
    }

    #[test]
    fn test_direct_image() {
        let post = post_with_url("i.example", "https://i.example/cat.jpg");
        assert_eq!(
            extract(&post),
            vec![MediaCandidate::new("https://i.example/cat.jpg", SourceKind::Direct)]
        );
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_hosted_video_link_is_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let post = Post {
            title: "Clip".into(),
            ..post_with_url("v.redd.it", "https://v.redd.it/xyz/DASH_720.mp4")
        };
        let candidates = tracing::subscriber::with_default(subscriber, || extract(&post));

        assert_eq!(
            candidates,
            vec![MediaCandidate::new(
                "https://v.redd.it/xyz/DASH_720.mp4",
                SourceKind::HostedVideo
            )]
        );
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Hosted video link: Clip"), "{}", output);
    }

    #[test]
    fn test_direct_extension_ignores_query_and_case() {
        let post = post_with_url("i.example", "https://i.example/cat.GIFV?x=1");
        assert_eq!(extract(&post)[0].source_kind, SourceKind::Direct);
    }

    #[test]
    fn test_redgifs_is_first() {
        let post = post_with_url("redgifs.com", "https://www.redgifs.com/watch/abc");
        let candidates = extract(&post);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source_kind, SourceKind::RedGifs);
        assert_eq!(candidates[0].source_url, "https://www.redgifs.com/watch/abc");
    }

    #[test]
    fn test_redgifs_with_media_extension_appends_direct_duplicate() {
        let post = post_with_url("redgifs.com", "https://media.redgifs.com/Abc.mp4");
        let candidates = extract(&post);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].source_kind, SourceKind::RedGifs);
        assert_eq!(candidates[1].source_kind, SourceKind::Direct);
        assert_eq!(candidates[0].source_url, candidates[1].source_url);
    }

    #[test]
    fn test_reddit_video_fallback_preferred_over_hls() {
        let mut post = post_with_url("v.redd.it", "https://v.redd.it/xyz");
        post.is_video = true;
        post.media = Some(PostMedia {
            reddit_video: Some(video(
                Some("https://v.redd.it/xyz/DASH_720.mp4"),
                Some("https://v.redd.it/xyz/HLSPlaylist.m3u8"),
            )),
        });

        let candidates = extract(&post);
        assert_eq!(
            candidates,
            vec![
                MediaCandidate::new("https://v.redd.it/xyz/DASH_720.mp4", SourceKind::HostedVideo),
                MediaCandidate::new("https://v.redd.it/xyz", SourceKind::HostedVideo),
            ]
        );
    }

    #[test]
    fn test_reddit_video_hls_only() {
        let mut post = Post {
            id: "v".into(),
            is_video: true,
            ..Default::default()
        };
        post.media = Some(PostMedia {
            reddit_video: Some(video(None, Some("https://v.redd.it/xyz/HLSPlaylist.m3u8"))),
        });

        let candidates = extract(&post);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source_url, "https://v.redd.it/xyz/HLSPlaylist.m3u8");
    }

    #[test]
    fn test_video_ignored_when_not_flagged() {
        let post = Post {
            id: "v".into(),
            is_video: false,
            media: Some(PostMedia {
                reddit_video: Some(video(Some("https://v.redd.it/xyz/DASH_720.mp4"), None)),
            }),
            ..Default::default()
        };
        assert!(extract(&post).is_empty());
    }

    #[test]
    fn test_preview_only_when_nothing_else() {
        let preview = Some(PostPreview {
            reddit_video_preview: Some(video(Some("https://v.redd.it/p/DASH_360.mp4"), None)),
        });

        let mut gif_post = post_with_url("imgur.com", "https://imgur.com/page");
        gif_post.preview = preview.clone();
        let candidates = extract(&gif_post);
        assert_eq!(
            candidates,
            vec![MediaCandidate::new("https://v.redd.it/p/DASH_360.mp4", SourceKind::HostedVideo)]
        );

        let mut redgifs_post = post_with_url("redgifs.com", "https://www.redgifs.com/watch/abc");
        redgifs_post.preview = preview;
        let candidates = extract(&redgifs_post);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source_kind, SourceKind::RedGifs);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let post = post_with_url("i.example", "https://i.example/cat.png");
        assert_eq!(extract(&post), extract(&post));
    }
}
