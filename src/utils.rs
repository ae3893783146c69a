//! Utility functions for text cleanup, timestamps and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Markup stripping and whitespace collapsing for summaries
//! - Character-boundary-safe truncation with a visible marker
//! - String truncation for logging
//! - Report timestamp formatting
//! - File system validation for the output path

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Marker appended to text cut by [`truncate_chars`].
pub const TRUNCATION_MARKER: &str = "...";

/// Remove HTML tags and common entities, then collapse whitespace.
///
/// Any `<` or `>` left after tag removal is dropped as well so the result is
/// safe to drop into markup on the front end.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("<p>Hello&nbsp; <b>world</b></p>"), "Hello world");
/// ```
pub fn clean_text(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "")
        .replace("&gt;", "")
        .replace(['<', '>'], "");
    collapse_whitespace(&decoded)
}

/// Collapse every run of whitespace into one space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WS_RE.replace_all(s.trim(), " ").into_owned()
}

/// Truncate to at most `max` characters, appending [`TRUNCATION_MARKER`]
/// when anything was cut.
///
/// Counts characters, not bytes, so multi-byte text is never split.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("hello world", 5), "hello...");
/// assert_eq!(truncate_chars("hi", 5), "hi");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}{}", s[..byte_idx].trim_end(), TRUNCATION_MARKER),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}…(+{} bytes)", &s[..byte_idx], s.len() - byte_idx),
    }
}

/// Format the report's `lastUpdate` value: `YYYY/MM/DD HH:MM` in local time.
pub fn format_last_update(now: DateTime<Local>) -> String {
    now.format("%Y/%m/%d %H:%M").to_string()
}

/// Ensure the directory that will hold `path` exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_parent(path: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;

    // Try a small sync write using std fs (simpler error surface)
    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}
