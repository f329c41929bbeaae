//! Listing module: reading saved posts from a file or from Reddit.

pub mod parse;
pub mod source;

pub use parse::{parse_listing, parse_listing_str};
pub use source::{load_posts, source_from_config, FileListing, ListingSource, RemoteListing};
