//! Source adapters turning upstream responses into [`RawItem`]s.
//!
//! Every adapter implements [`SourceAdapter`]. The pipeline only ever sees
//! the trait, so adapters are interchangeable and independently testable.
//!
//! # Supported Sources
//!
//! | Kind | Module | Method | Notes |
//! |------|--------|--------|-------|
//! | `feed` | [`feed`] | RSS 2.0 / RSS 1.0 / Atom | Newest `limit` entries in document order |
//! | `registry` | [`registry`] | JSON listing API | Hugging Face model listing, follows `Link` pages |
//! | `trending` | [`trending`] | HTML scraping | GitHub trending; no matches is an empty result |
//! | `search` | [`search`] | JSON search API | Tavily-compatible POST |
//! | `social` | [`social`] | `bird` CLI subprocess | Twitter/X search |
//! | (offline) | [`offline`] | Embedded fixtures | Forced offline mode |
//!
//! # Failure Model
//!
//! Adapters return `Err` for any network, status, decode or subprocess
//! failure. The pipeline logs it against the source name and carries on with
//! zero items from that source; nothing here retries.

pub mod feed;
pub mod offline;
pub mod registry;
pub mod search;
pub mod social;
pub mod trending;

use crate::config::{NewsConfig, SourceDescriptor, SourceKind};
use crate::error::SourceError;
use crate::models::RawItem;
use reqwest::{Client, Response};
use std::time::Duration;

/// Fetch raw items for one configured source.
pub trait SourceAdapter {
    /// Fetch at most `source.limit` raw items.
    ///
    /// # Errors
    ///
    /// Any failure to reach or decode the source. Callers treat it as a
    /// soft failure.
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawItem>, SourceError>;
}

/// Live adapter set, dispatching on [`SourceKind`].
#[derive(Debug)]
pub struct HttpFetcher {
    feed: feed::FeedAdapter,
    registry: registry::RegistryAdapter,
    trending: trending::TrendingAdapter,
    search: search::SearchAdapter,
    social: social::SocialAdapter,
}

impl HttpFetcher {
    /// Build every adapter around one shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &NewsConfig, search_api_key: Option<String>) -> Result<Self, SourceError> {
        let client = build_client(config.request_timeout_secs, &config.user_agent)?;
        Ok(Self {
            feed: feed::FeedAdapter::new(client.clone()),
            registry: registry::RegistryAdapter::new(client.clone()),
            trending: trending::TrendingAdapter::new(client.clone()),
            search: search::SearchAdapter::new(client, search_api_key),
            social: social::SocialAdapter::new(Duration::from_secs(config.request_timeout_secs)),
        })
    }
}

impl SourceAdapter for HttpFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawItem>, SourceError> {
        match source.kind {
            SourceKind::Feed => self.feed.fetch(source).await,
            SourceKind::Registry => self.registry.fetch(source).await,
            SourceKind::Trending => self.trending.fetch(source).await,
            SourceKind::Search => self.search.fetch(source).await,
            SourceKind::Social => self.social.fetch(source).await,
        }
    }
}

/// HTTP client with the fixed per-request timeout every adapter shares.
pub fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, SourceError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()?)
}

/// Reject non-2xx responses with [`SourceError::Status`].
pub(crate) fn check_status(response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}
