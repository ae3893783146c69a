//! Keyword-search API adapter (Tavily-compatible request/response shape).

use crate::config::SourceDescriptor;
use crate::error::SourceError;
use crate::models::{Metrics, RawItem};
use crate::sources::{SourceAdapter, check_status};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub struct SearchAdapter {
    client: Client,
    api_key: Option<String>,
}

impl SearchAdapter {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

impl std::fmt::Debug for SearchAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAdapter")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    topic: &'static str,
    #[serde(skip_serializing_if = "no_domains")]
    include_domains: &'a [String],
    #[serde(skip_serializing_if = "no_domains")]
    exclude_domains: &'a [String],
}

fn no_domains(domains: &&[String]) -> bool {
    domains.is_empty()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    published_date: Option<String>,
    score: Option<f64>,
}

impl SourceAdapter for SearchAdapter {
    #[instrument(level = "info", skip_all, fields(source = %source.name))]
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawItem>, SourceError> {
        let query = source
            .query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| SourceError::Descriptor(format!("{} has no query", source.name)))?;

        let request = SearchRequest {
            query,
            max_results: source.limit,
            topic: "news",
            include_domains: &source.include_domains,
            exclude_domains: &source.exclude_domains,
        };

        let mut builder = self.client.post(&source.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let body = check_status(builder.send().await?)?.text().await?;
        let response: SearchResponse = serde_json::from_str(&body)?;

        let items: Vec<RawItem> = response
            .results
            .into_iter()
            .filter(|hit| hit.url.is_some())
            .take(source.limit)
            .map(hit_to_item)
            .collect();
        info!(count = items.len(), "Collected search hits");
        Ok(items)
    }
}

fn hit_to_item(hit: SearchHit) -> RawItem {
    let mut metrics = Metrics::new();
    if let Some(score) = hit.score {
        // relevance in [0, 1] kept as a percentage counter
        metrics.insert("relevance".to_string(), (score.clamp(0.0, 1.0) * 100.0).round() as u64);
    }
    RawItem {
        title: hit.title,
        link: hit.url,
        published: hit.published_date,
        summary: hit.content,
        metrics,
        ..Default::default()
    }
}
