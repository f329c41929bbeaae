//! Media module for the post model and candidate extraction.

pub mod extractor;
pub mod post;

pub use extractor::{extract, MediaCandidate, SourceKind};
pub use post::{Post, PostMedia, PostPreview, RedditVideo};
