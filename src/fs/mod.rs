//! Filesystem module.
//!
//! Provides:
//! - Filename planning and sanitizing
//! - Temp paths, validity checks and cleanup of incomplete downloads

pub mod naming;
pub mod paths;

pub use naming::{
    plan_destination, plan_filename, sanitize_filename, sanitize_title, url_basename,
    url_extension, with_index_suffix,
};
pub use paths::{
    cleanup_incomplete_downloads, display_name, ensure_dir, has_valid_file, temp_path,
};
