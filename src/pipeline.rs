//! Pipeline driver: fetch → normalize → dedup → classify → bucket → sort.
//!
//! Sources are fetched up to `concurrency` at a time, but their results are
//! replayed strictly in configured order (category order, then source order)
//! before anything touches the dedup set. The first source to produce an
//! identity therefore always wins, whatever order the fetches finished in.

use crate::classify::Classifier;
use crate::config::{NewsConfig, SourceDescriptor};
use crate::dedup::Deduplicator;
use crate::models::{Article, RawItem, Report};
use crate::normalize::normalize;
use crate::report::build_report;
use crate::sources::SourceAdapter;
use crate::translate::{NoTranslation, Translate};
use chrono::{DateTime, Local, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// One aggregation run over every configured source.
///
/// The dedup set and category buckets live only inside [`Aggregator::run`],
/// so running twice never leaks state between runs.
pub struct Aggregator<'a, A, T = NoTranslation> {
    config: &'a NewsConfig,
    adapter: &'a A,
    translator: T,
    classifier: Classifier,
}

impl<'a, A: SourceAdapter> Aggregator<'a, A> {
    pub fn new(config: &'a NewsConfig, adapter: &'a A) -> Self {
        Self {
            config,
            adapter,
            translator: NoTranslation,
            classifier: Classifier::new(config),
        }
    }
}

impl<'a, A: SourceAdapter, T: Translate> Aggregator<'a, A, T> {
    /// Translate admitted titles with `translator`.
    pub fn with_translator<U: Translate>(self, translator: U) -> Aggregator<'a, A, U> {
        Aggregator {
            config: self.config,
            adapter: self.adapter,
            translator,
            classifier: self.classifier,
        }
    }

    /// Run the whole pipeline and build the report, stamped with `now`.
    ///
    /// Never fails: a source that errors contributes nothing.
    #[instrument(level = "info", skip_all, fields(concurrency = self.config.concurrency))]
    pub async fn run(&self, now: DateTime<Local>) -> Report {
        let now_utc = now.with_timezone(&Utc);
        let sources: Vec<&SourceDescriptor> = self.config.sources().collect();

        // `buffered` yields results in input order
        let fetched: Vec<Vec<RawItem>> = stream::iter(sources.iter().copied())
            .map(|source| self.fetch_soft(source))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let slots: HashMap<&str, usize> = self
            .config
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key.as_str(), i))
            .collect();
        let mut buckets: Vec<Vec<Article>> = vec![Vec::new(); self.config.categories.len()];
        let mut dedup = Deduplicator::new();

        for (source, raws) in sources.iter().zip(fetched) {
            let fetched_count = raws.len();
            let mut admitted = 0usize;
            let mut duplicates = 0usize;

            for raw in raws {
                let Some(mut article) =
                    normalize(raw, &source.name, now_utc, self.config.summary_max_chars)
                else {
                    debug!(source = %source.name, "Dropped item without link or post id");
                    continue;
                };
                if !dedup.admit(&article) {
                    duplicates += 1;
                    continue;
                }

                if self.translator.enabled() {
                    let translated = self.translator.translate_or_original(&article.title).await;
                    if translated != article.title {
                        article.title_translated = Some(translated);
                    }
                }

                article.category = self.classifier.classify(&article).to_string();
                match slots.get(article.category.as_str()) {
                    Some(&slot) => {
                        buckets[slot].push(article);
                        admitted += 1;
                    }
                    None => warn!(category = %article.category, "Classifier returned unknown category"),
                }
            }

            info!(
                source = %source.name,
                fetched = fetched_count,
                admitted,
                duplicates,
                "Processed source"
            );
        }

        let counts: Vec<usize> = buckets.iter().map(Vec::len).collect();
        let mut articles: Vec<Article> = buckets.into_iter().flatten().collect();
        // stable: equal timestamps keep category order
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        info!(
            total = articles.len(),
            unique_identities = dedup.len(),
            "Aggregation complete"
        );
        build_report(&self.config.categories, &counts, articles, now)
    }

    #[instrument(level = "info", skip_all, fields(source = %source.name, kind = source.kind.as_str()))]
    async fn fetch_soft(&self, source: &SourceDescriptor) -> Vec<RawItem> {
        match self.adapter.fetch(source).await {
            Ok(mut items) => {
                items.truncate(source.limit);
                items
            }
            Err(e) => {
                warn!(source = %source.name, error = %e, "Source failed; continuing without it");
                Vec::new()
            }
        }
    }
}
