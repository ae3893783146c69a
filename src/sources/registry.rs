//! Model-registry adapter (Hugging Face `/api/models` listing shape).
//!
//! The listing is requested sorted by a popularity metric, descending, and
//! the top `limit` records are kept. Records carry no prose, so the summary
//! is synthesized from the pipeline tag and the download/like counters.
//! Pagination follows the `Link: <...>; rel="next"` header.

use crate::config::SourceDescriptor;
use crate::error::SourceError;
use crate::models::{Metrics, RawItem};
use crate::sources::{SourceAdapter, check_status};
use reqwest::Client;
use reqwest::header::LINK;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

/// Upper bound on listing pages per source.
const MAX_PAGES: usize = 5;

/// Largest page the listing endpoint serves.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug)]
pub struct RegistryAdapter {
    client: Client,
}

impl RegistryAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelRecord {
    id: Option<String>,
    model_id: Option<String>,
    #[serde(default)]
    downloads: u64,
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(rename = "pipeline_tag")]
    pipeline_tag: Option<String>,
    created_at: Option<String>,
    last_modified: Option<String>,
}

impl SourceAdapter for RegistryAdapter {
    #[instrument(level = "info", skip_all, fields(source = %source.name))]
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawItem>, SourceError> {
        let base = Url::parse(&source.endpoint)
            .map_err(|e| SourceError::Descriptor(format!("{}: {e}", source.endpoint)))?;
        let origin = base.origin().ascii_serialization();

        let mut next = Some(listing_url(base, source));
        let mut records: Vec<ModelRecord> = Vec::new();
        let mut pages = 0;

        while let Some(url) = next.take() {
            if records.len() >= source.limit || pages >= MAX_PAGES {
                break;
            }
            pages += 1;

            let response = check_status(self.client.get(url.clone()).send().await?)?;
            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_link);
            let page: Vec<ModelRecord> = serde_json::from_str(&response.text().await?)?;
            debug!(page = pages, count = page.len(), %url, "Fetched registry page");
            if page.is_empty() {
                break;
            }
            records.extend(page);
        }

        let items: Vec<RawItem> = records
            .into_iter()
            .take(source.limit)
            .filter_map(|record| record_to_item(record, &origin))
            .collect();
        info!(count = items.len(), pages, "Collected registry records");
        Ok(items)
    }
}

fn listing_url(mut base: Url, source: &SourceDescriptor) -> Url {
    let sort = source.sort.as_deref().unwrap_or("downloads");
    base.query_pairs_mut()
        .append_pair("sort", sort)
        .append_pair("direction", "-1")
        .append_pair("limit", &source.limit.min(MAX_PAGE_SIZE).to_string());
    base
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
fn next_page_link(header: &str) -> Option<Url> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| p.trim().trim_start_matches("rel=").trim_matches('"') == "next");
        if !is_next {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

fn record_to_item(record: ModelRecord, origin: &str) -> Option<RawItem> {
    let id = record.id.or(record.model_id)?;

    let mut summary = match &record.pipeline_tag {
        Some(task) => format!("{task} model. "),
        None => String::new(),
    };
    summary.push_str(&format!(
        "Downloads: {} · Likes: {}",
        record.downloads, record.likes
    ));

    let mut tags = Vec::new();
    if let Some(task) = record.pipeline_tag {
        tags.push(task);
    }
    // registry bookkeeping tags such as `region:us` carry no topic
    tags.extend(record.tags.into_iter().filter(|t| !t.contains(':')));

    let mut metrics = Metrics::new();
    metrics.insert("downloads".to_string(), record.downloads);
    metrics.insert("likes".to_string(), record.likes);

    Some(RawItem {
        title: Some(id.clone()),
        link: Some(format!("{origin}/{id}")),
        created_at: record.created_at,
        updated: record.last_modified,
        summary: Some(summary),
        tags,
        metrics,
        ..Default::default()
    })
}
