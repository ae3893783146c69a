//! Offline fixtures used by `--offline`.
//!
//! Serves sample raw items keyed by source name instead of touching the
//! network, so the front end always has something to render. The built-in
//! fixtures live in `config/fallback.yaml`.

use crate::config::SourceDescriptor;
use crate::error::{ConfigError, SourceError};
use crate::models::RawItem;
use crate::sources::SourceAdapter;
use chrono::{Duration, Utc};
use rand::{Rng, rng};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

const DEFAULT_FIXTURES: &str = include_str!("../../config/fallback.yaml");

#[derive(Debug, Clone, Deserialize)]
struct FixtureItem {
    #[serde(flatten)]
    raw: RawItem,
    /// Publish time relative to the run, in hours.
    #[serde(default)]
    hours_ago: i64,
}

#[derive(Debug, Deserialize)]
struct Fixtures {
    #[serde(default)]
    sources: HashMap<String, Vec<FixtureItem>>,
}

#[derive(Debug)]
pub struct OfflineFetcher {
    sources: HashMap<String, Vec<FixtureItem>>,
    /// Spread publish times by up to this many minutes.
    jitter_minutes: i64,
}

impl OfflineFetcher {
    /// Fixtures compiled into the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_FIXTURES)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let fixtures: Fixtures = serde_yaml::from_str(yaml)?;
        Ok(Self {
            sources: fixtures.sources,
            jitter_minutes: 30,
        })
    }

    /// Disable publish-time jitter, for reproducible output.
    #[cfg(test)]
    pub fn without_jitter(mut self) -> Self {
        self.jitter_minutes = 0;
        self
    }
}

impl SourceAdapter for OfflineFetcher {
    #[instrument(level = "debug", skip_all, fields(source = %source.name))]
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawItem>, SourceError> {
        let now = Utc::now();
        let items: Vec<RawItem> = self
            .sources
            .get(&source.name)
            .map(|fixtures| {
                fixtures
                    .iter()
                    .take(source.limit)
                    .map(|fixture| {
                        let mut raw = fixture.raw.clone();
                        if raw.published.is_none() {
                            let jitter = if self.jitter_minutes > 0 {
                                rng().random_range(0..self.jitter_minutes)
                            } else {
                                0
                            };
                            let at = now
                                - Duration::hours(fixture.hours_ago)
                                - Duration::minutes(jitter);
                            raw.published = Some(at.to_rfc3339());
                        }
                        raw
                    })
                    .collect()
            })
            .unwrap_or_default();
        debug!(count = items.len(), "Served offline fixtures");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NewsConfig;
    use crate::normalize::parse_timestamp;

    fn descriptor(name: &str, limit: usize) -> SourceDescriptor {
        serde_yaml::from_str(&format!(
            "name: \"{name}\"\nkind: feed\nendpoint: https://example.com\nlimit: {limit}\n"
        ))
        .unwrap()
    }

    #[test]
    fn builtin_fixtures_cover_configured_sources() {
        let fetcher = OfflineFetcher::builtin().unwrap();
        let config = NewsConfig::builtin().unwrap();
        let covered = config
            .sources()
            .filter(|s| fetcher.sources.contains_key(&s.name))
            .count();
        assert!(covered >= config.categories.len());
    }

    #[tokio::test]
    async fn serves_items_by_source_name_with_publish_times() {
        let fetcher = OfflineFetcher::from_yaml(
            "sources:\n  A:\n    - title: one\n      link: https://a.test/1\n      hours_ago: 2\n    - title: two\n      link: https://a.test/2\n",
        )
        .unwrap()
        .without_jitter();

        let items = fetcher.fetch(&descriptor("A", 10)).await.unwrap();
        assert_eq!(items.len(), 2);
        let first = parse_timestamp(items[0].published.as_deref().unwrap()).unwrap();
        let second = parse_timestamp(items[1].published.as_deref().unwrap()).unwrap();
        assert_eq!(second - first, Duration::hours(2));

        assert_eq!(fetcher.fetch(&descriptor("A", 1)).await.unwrap().len(), 1);
        assert!(fetcher.fetch(&descriptor("B", 10)).await.unwrap().is_empty());
    }
}
