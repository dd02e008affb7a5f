//! Filename generation for rendered posts.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{Error, Result};

/// Longest title fragment kept in a filename, in characters.
const MAX_TITLE_CHARS: usize = 80;

static DOT_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{2,}").unwrap());

/// Sanitize a path component (folder or file name).
///
/// Separators and characters reserved on common filesystems are replaced with
/// underscores. Traversal patterns and null bytes are rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim().to_string();
    if sanitized.is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Build the HTML filename for a rendered post body.
///
/// Format: `<published>_<post id>_<title>.html`, e.g.
/// `2024-01-31T12-00-00_1234567_Hello world.html`.
pub fn post_filename(published: &DateTime<Utc>, post_id: &str, title: &str) -> Result<String> {
    let post_id = sanitize_path_component(post_id)?;
    let title: String = DOT_RUNS
        .replace_all(title, ".")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();

    let stem = match sanitize_path_component(&title) {
        Ok(title) => format!(
            "{}_{}_{}",
            published.format("%Y-%m-%dT%H-%M-%S"),
            post_id,
            title
        ),
        Err(_) => format!("{}_{}", published.format("%Y-%m-%dT%H-%M-%S"), post_id),
    };

    Ok(format!("{}.html", stem))
}
