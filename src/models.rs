//! Data models for raw source items, normalized articles and the output report.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawItem`]: Loosely-typed item as produced by a source adapter
//! - [`Article`]: Normalized, classified item written to the report
//! - [`Report`]: The single JSON document consumed by the front end
//!
//! The serialized field names are read directly by the static front end, so
//! they must not change. `Report` uses camelCase for its root keys while the
//! article fields keep the snake_case names the front end has always used.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named counters attached to an article (likes, retweets, downloads, ...).
pub type Metrics = BTreeMap<String, u64>;

/// An item as scraped or decoded from one source, before normalization.
///
/// Every field is optional. Several fields are aliases of each other
/// (`title`/`alt_title`/`text`, `published`/`updated`/`created_at`); the
/// normalizer picks the best one available.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawItem {
    pub title: Option<String>,
    pub alt_title: Option<String>,
    /// Full body text, used by social posts that have no headline.
    pub text: Option<String>,
    pub link: Option<String>,
    /// Source-native post identifier (social posts only).
    pub post_id: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub created_at: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Option<Author>,
    #[serde(default)]
    pub metrics: Metrics,
}

/// Author details for social posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Author {
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A normalized article.
///
/// `category` is empty until the classifier runs; every article that reaches
/// the [`Report`] carries one of the configured category keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Dedup key: canonical URL, or `x:<status id>` for social posts.
    #[serde(rename = "id")]
    pub identity: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_translated: Option<String>,
    pub summary: String,
    /// Full post text, for sources that have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(rename = "source")]
    pub source_name: String,
    pub url: String,
    pub tags: Vec<String>,
    pub category: String,
    pub metrics: Metrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// Per-category metadata in the report header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub count: usize,
}

/// Root of the output document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Time the report was built, `YYYY/MM/DD HH:MM` local time.
    pub last_update: String,
    pub categories: Vec<CategorySummary>,
    pub articles: Vec<Article>,
}
