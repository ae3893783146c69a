//! Coerce heterogeneous [`RawItem`]s into the common [`Article`] shape.
//!
//! Normalization never fails on a missing field: titles, dates and summaries
//! all have fallbacks. The only item that is dropped is one with neither a
//! usable link nor a post id, since it cannot be deduplicated.

use crate::models::{Article, RawItem};
use crate::utils::{clean_text, collapse_whitespace, truncate_chars};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Title used when an item has no usable title or text.
pub const PLACEHOLDER_TITLE: &str = "AI News Update";

/// Maximum number of tags kept per article.
pub const MAX_TAGS: usize = 5;

/// Titles synthesized from a post body are cut to this many characters.
const TITLE_FROM_TEXT_MAX: usize = 80;

static STATUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?:[^/]+/)*status(?:es)?/(\d+)(?:/|$)").unwrap());

/// Hosts whose `/status/<id>` permalinks identify a social post.
const SOCIAL_HOSTS: &[&str] = &["x.com", "twitter.com", "mobile.twitter.com"];

/// Normalize one raw item from `source_name`.
///
/// `now` is substituted for a missing or unparseable publish time and
/// `summary_max` bounds the summary length in characters.
pub fn normalize(
    raw: RawItem,
    source_name: &str,
    now: DateTime<Utc>,
    summary_max: usize,
) -> Option<Article> {
    let (identity, url) = derive_identity(&raw)?;

    let title = pick_title(&raw);
    let published_at = [&raw.published, &raw.updated, &raw.created_at]
        .into_iter()
        .flatten()
        .find_map(|s| parse_timestamp(s))
        .unwrap_or(now);

    let summary_source = raw
        .summary
        .as_deref()
        .map(clean_text)
        .filter(|s| !s.is_empty())
        .or_else(|| raw.text.as_deref().map(clean_text))
        .unwrap_or_default();
    let summary = truncate_chars(&summary_source, summary_max);

    let content = raw
        .text
        .as_deref()
        .map(clean_text)
        .filter(|t| !t.is_empty());

    let tags = raw
        .tags
        .iter()
        .map(|t| collapse_whitespace(t.trim_start_matches('#')))
        .filter(|t| !t.is_empty())
        .unique()
        .take(MAX_TAGS)
        .collect();

    Some(Article {
        identity,
        title,
        title_translated: None,
        summary,
        content,
        published_at,
        source_name: source_name.to_string(),
        url,
        tags,
        category: String::new(),
        metrics: raw.metrics,
        author: raw.author,
    })
}

/// Identity key and canonical link for an item.
///
/// Social posts are keyed by their numeric status id as `x:<id>`, taken from
/// the payload when present and from the `/status/<id>` path segment
/// otherwise, so the same post found through different URLs collapses to
/// one article. Everything else is keyed by its canonical URL.
fn derive_identity(raw: &RawItem) -> Option<(String, String)> {
    let link = raw.link.as_deref().map(str::trim).filter(|l| !l.is_empty());

    let post_id = raw
        .post_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| link.and_then(status_id));

    if let Some(id) = post_id {
        let url = link
            .and_then(canonical_url)
            .unwrap_or_else(|| format!("https://x.com/i/status/{id}"));
        return Some((format!("x:{id}"), url));
    }

    let url = canonical_url(link?)?;
    Some((url.clone(), url))
}

/// Extract the status id from a Twitter/X permalink.
///
/// Links on any other host never yield an id, whatever their path.
pub fn status_id(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(host.as_str());
    if !SOCIAL_HOSTS.contains(&host) {
        return None;
    }
    STATUS_RE
        .captures(url.path())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Canonical form of a link: http(s) only, no fragment, no `utm_*` tracking
/// parameters, no trailing slash on non-root paths.
pub fn canonical_url(link: &str) -> Option<String> {
    let mut url = Url::parse(link.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !k.starts_with("utm_"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }
    Some(url.to_string())
}

fn pick_title(raw: &RawItem) -> String {
    [&raw.title, &raw.alt_title]
        .into_iter()
        .flatten()
        .map(|t| collapse_whitespace(&clean_text(t)))
        .find(|t| !t.is_empty())
        .or_else(|| {
            raw.text.as_deref().and_then(|text| {
                let first_line = clean_text(text.lines().find(|l| !l.trim().is_empty())?);
                if first_line.chars().count() > TITLE_FROM_TEXT_MAX {
                    Some(truncate_chars(&first_line, TITLE_FROM_TEXT_MAX - 3))
                } else {
                    Some(first_line)
                }
            })
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string())
}

/// Best-effort timestamp parsing across the formats sources use.
///
/// Accepts RFC 3339, RFC 2822 (RSS `pubDate`), the Twitter `created_at`
/// layout, and naive ISO-8601 date-times or dates, which are taken as UTC.
/// An RFC 2822 date whose weekday disagrees with the date is still accepted.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_rfc2822_ignoring_weekday(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%a %b %d %H:%M:%S %z %Y") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `Ddd, DD Mon YYYY HH:MM:SS zone` with the weekday dropped.
fn parse_rfc2822_ignoring_weekday(s: &str) -> Option<DateTime<Utc>> {
    let rest = match s.split_once(',') {
        Some((_, rest)) => rest.trim(),
        None => s,
    };
    let rest = match rest.rsplit_once(' ') {
        Some((head, "GMT" | "UT" | "UTC" | "Z")) => format!("{head} +0000"),
        _ => rest.to_string(),
    };
    DateTime::parse_from_str(&rest, "%d %b %Y %H:%M:%S %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
