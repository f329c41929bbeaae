//! Filename generation and manipulation.

use std::path::{Path, PathBuf};

use url::Url;

use crate::config::FilenameStyle;
use crate::dedup::url_hash;
use crate::error::{Error, Result};
use crate::media::{MediaCandidate, Post, SourceKind};

/// Maximum number of characters kept from a post title.
pub const MAX_TITLE_CHARS: usize = 50;

/// Extension used when a video URL carries none.
pub const DEFAULT_VIDEO_EXTENSION: &str = ".mp4";

/// Streaming manifests fetched through the external downloader.
const PLAYLIST_EXTENSIONS: &[&str] = &[".m3u8", ".mpd"];

/// Validate a filename, rejecting anything that could escape the output directory.
pub fn sanitize_filename(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    // Sanitize remaining problematic characters
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Reduce a post title to `[alphanumeric-_]`, at most 50 characters.
pub fn sanitize_title(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_TITLE_CHARS)
        .collect()
}

/// Path component of a URL, without query or fragment.
fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Last segment of a URL's path.
pub fn url_basename(url: &str) -> String {
    url_path(url)
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Lowercased extension (with leading dot) of a URL's path, if it has one.
pub fn url_extension(url: &str) -> Option<String> {
    let basename = url_basename(url);
    let dot = basename.rfind('.')?;

    // Leading dots mark hidden names, not extensions
    if basename[..dot].trim_start_matches('.').is_empty() {
        return None;
    }

    let ext = &basename[dot..];
    if ext.len() < 2 {
        return None;
    }

    Some(ext.to_lowercase())
}

/// Build the filename for one candidate of a post.
///
/// Returns `None` when no extension can be derived, which means the
/// candidate cannot be named and should be dropped.
pub fn plan_filename(post: &Post, candidate: &MediaCandidate, style: FilenameStyle) -> Option<String> {
    let url = candidate.source_url.as_str();

    let ext = match url_extension(url) {
        // Playlists are saved as the merged video
        Some(ext)
            if candidate.source_kind == SourceKind::HostedVideo
                && PLAYLIST_EXTENSIONS.contains(&ext.as_str()) =>
        {
            DEFAULT_VIDEO_EXTENSION.to_string()
        }
        Some(ext) => ext,
        None if candidate.source_kind == SourceKind::RedGifs || post.is_video => {
            DEFAULT_VIDEO_EXTENSION.to_string()
        }
        None => return None,
    };

    let title = sanitize_title(&post.title);

    let filename = match style {
        FilenameStyle::Basic => format!("{} --- {}{}", title, post.id, ext),
        FilenameStyle::Pretty => format!("{}{}", title, ext),
        FilenameStyle::Advanced => format!("{}-{}-{}{}", title, post.id, url_hash(url), ext),
        FilenameStyle::Original => url_basename(url),
    };

    Some(filename)
}

/// Insert `_{index}` before the extension of a filename.
pub fn with_index_suffix(filename: &str, index: usize) -> String {
    match split_extension(filename) {
        (stem, Some(ext)) => format!("{}_{}{}", stem, index, ext),
        (stem, None) => format!("{}_{}", stem, index),
    }
}

/// Split a filename into stem and extension (with dot).
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => (&filename[..dot], Some(&filename[dot..])),
        _ => (filename, None),
    }
}

/// Plan the destination path for one candidate of a post.
///
/// `group_size` is the number of candidates the post yielded; when it is
/// larger than one the 1-based `index` is appended to the filename.
pub fn plan_destination(
    output_dir: &Path,
    post: &Post,
    candidate: &MediaCandidate,
    style: FilenameStyle,
    index: usize,
    group_size: usize,
) -> Result<Option<PathBuf>> {
    let filename = match plan_filename(post, candidate, style) {
        Some(name) => name,
        None => return Ok(None),
    };

    let filename = if group_size > 1 {
        with_index_suffix(&filename, index)
    } else {
        filename
    };

    let filename = sanitize_filename(&filename)?;
    Ok(Some(output_dir.join(filename)))
}
