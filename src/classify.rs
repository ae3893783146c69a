//! Keyword-scoring classifier.
//!
//! Categories are held as an ordered rule table of `(key, keywords)` pairs in
//! configuration order. An article scores one point per keyword found as a
//! substring of its lowercased title and summary; the strictly highest score
//! wins and ties go to the earlier category. No match at all yields the
//! configured default category. Articles from research-paper sources skip
//! scoring and always land in the research category.
//!
//! This is a best-effort heuristic, not a topical guarantee.

use crate::config::NewsConfig;
use crate::models::Article;
use std::collections::HashSet;
use tracing::trace;

#[derive(Debug, Clone)]
struct Rule {
    key: String,
    keywords: Vec<String>,
}

/// Ordered keyword rule table built from the category configuration.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    default_category: String,
    research_category: String,
    research_sources: HashSet<String>,
}

impl Classifier {
    pub fn new(config: &NewsConfig) -> Self {
        Self {
            rules: config
                .categories
                .iter()
                .map(|c| Rule {
                    key: c.key.clone(),
                    keywords: c.keywords.iter().map(|k| k.to_lowercase()).collect(),
                })
                .collect(),
            default_category: config.default_category.clone(),
            research_category: config.research_category.clone(),
            research_sources: config.research_sources.iter().cloned().collect(),
        }
    }

    /// Category key for `article`. Deterministic for a fixed configuration.
    pub fn classify(&self, article: &Article) -> &str {
        if self.research_sources.contains(&article.source_name) {
            return &self.research_category;
        }

        let haystack = haystack(article);
        let mut best: Option<(&str, usize)> = None;
        for rule in &self.rules {
            let score = rule
                .keywords
                .iter()
                .filter(|k| haystack.contains(k.as_str()))
                .count();
            // strictly greater keeps the earliest category on ties
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((rule.key.as_str(), score));
            }
        }

        match best {
            Some((key, score)) => {
                trace!(id = %article.identity, category = key, score, "Classified by keywords");
                key
            }
            None => &self.default_category,
        }
    }
}

fn haystack(article: &Article) -> String {
    let mut text = format!("{} {}", article.title, article.summary);
    if let Some(translated) = &article.title_translated {
        text.push(' ');
        text.push_str(translated);
    }
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metrics;
    use chrono::Utc;

    const CONFIG: &str = r#"
default_category: industry
research_category: research
research_sources: ["arXiv cs.AI"]
categories:
  - key: model
    name: Models
    keywords: ["model", "weights", "llama"]
  - key: tool
    name: Tools
    keywords: ["tool", "cli"]
  - key: research
    name: Research
    keywords: ["paper"]
  - key: opensource
    name: Open Source
    keywords: ["github", "open source"]
  - key: industry
    name: Industry
    keywords: ["funding"]
"#;

    fn classifier() -> Classifier {
        Classifier::new(&NewsConfig::from_yaml(CONFIG).unwrap())
    }

    fn article(title: &str, summary: &str, source: &str) -> Article {
        Article {
            identity: format!("https://example.com/{}", title.len()),
            title: title.to_string(),
            title_translated: None,
            content: None,
            summary: summary.to_string(),
            published_at: Utc::now(),
            source_name: source.to_string(),
            url: String::new(),
            tags: vec![],
            category: String::new(),
            metrics: Metrics::new(),
            author: None,
        }
    }

    #[test]
    fn test_highest_score_wins() {
        let c = classifier();
        let a = article("A CLI tool for model weights", "open weights llama", "Feed");
        // model: model, weights, llama = 3; tool: tool, cli = 2
        assert_eq!(c.classify(&a), "model");
    }

    #[test]
    fn test_tie_goes_to_earlier_category() {
        let c = classifier();
        let a = article("New model tool", "", "Feed");
        assert_eq!(c.classify(&a), "model");
        let b = article("github tool", "", "Feed");
        assert_eq!(c.classify(&b), "tool");
    }

    #[test]
    fn test_zero_match_falls_back_to_default() {
        let c = classifier();
        let a = article("Weather is nice today", "nothing relevant", "Feed");
        assert_eq!(c.classify(&a), "industry");
    }

    #[test]
    fn test_research_source_overrides_scoring() {
        let c = classifier();
        let a = article("A new model with open weights on github", "", "arXiv cs.AI");
        assert_eq!(c.classify(&a), "research");
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        let c = classifier();
        let a = article("GitHub repo", "", "Feed");
        assert_eq!(c.classify(&a), "opensource");
    }

    #[test]
    fn test_translated_title_contributes() {
        let c = classifier();
        let mut a = article("新的开源项目", "", "Feed");
        assert_eq!(c.classify(&a), "industry");
        a.title_translated = Some("New open source project on GitHub".to_string());
        assert_eq!(c.classify(&a), "opensource");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = classifier();
        let a = article("funding for a model tool", "", "Feed");
        let first = c.classify(&a).to_string();
        for _ in 0..50 {
            assert_eq!(c.classify(&a), first);
        }
    }
}
