//! Per-run deduplication by identity key.

use crate::models::Article;
use std::collections::HashSet;

/// Set of identities already admitted during one pipeline run.
///
/// Owned by the aggregator for the duration of a single run; a fresh run
/// starts with a fresh set.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the article's identity.
    ///
    /// Returns `true` on first occurrence and `false` for a duplicate, which
    /// the caller must discard. An admitted article is never replaced.
    pub fn admit(&mut self, article: &Article) -> bool {
        self.seen.insert(article.identity.clone())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}
