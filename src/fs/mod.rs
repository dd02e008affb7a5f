//! File system utilities.
//!
//! Provides:
//! - Cache directory resolution
//! - Safe filenames for rendered posts

pub mod naming;
pub mod paths;

pub use naming::{post_filename, sanitize_path_component};
pub use paths::{default_cache_dir, ensure_dir, resolve_cache_dir};
