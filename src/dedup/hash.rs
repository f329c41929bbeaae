//! URL hashing for filenames.

use md5::{Digest, Md5};

/// Number of hex characters kept from the URL digest.
const URL_HASH_LEN: usize = 8;

/// Short, stable content hash of a URL (first 8 hex chars of its MD5).
pub fn url_hash(url: &str) -> String {
    let digest = Md5::digest(url.as_bytes());
    digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()[..URL_HASH_LEN]
        .to_string()
}
