//! Category and source configuration.
//!
//! The configuration is a YAML document listing the categories in display
//! order, each with its scoring keywords and the sources queried for it. A
//! default configuration is compiled into the binary from
//! `config/categories.yaml`; `--config` replaces it wholesale.
//!
//! The configuration is loaded once at startup and only read afterwards.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument};

const DEFAULT_CONFIG: &str = include_str!("../config/categories.yaml");

/// Kind tag selecting the adapter used for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// RSS 2.0 or Atom syndication document.
    Feed,
    /// Paginated model-registry listing (Hugging Face shape).
    Registry,
    /// HTML trending-repository listing.
    Trending,
    /// Keyword search API.
    Search,
    /// Social-post search through the `bird` CLI.
    Social,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Feed => "feed",
            SourceKind::Registry => "registry",
            SourceKind::Trending => "trending",
            SourceKind::Search => "search",
            SourceKind::Social => "social",
        }
    }
}

fn default_limit() -> usize {
    10
}

/// One upstream source queried for a category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub kind: SourceKind,
    /// URL of the feed/API/page. Unused by `social`.
    #[serde(default)]
    pub endpoint: String,
    /// Maximum number of items taken from this source.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Search query for `search` and `social` sources.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub include_domains: Vec<String>,
    #[serde(default)]
    pub exclude_domains: Vec<String>,
    /// Popularity metric a `registry` listing is sorted by.
    #[serde(default)]
    pub sort: Option<String>,
}

/// A topical category with its scoring keywords.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryDefinition {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Lowercase substrings scored against title and summary.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceDescriptor>,
}

fn default_summary_max_chars() -> usize {
    200
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_concurrency() -> usize {
    4
}

fn default_user_agent() -> String {
    format!("ai_news_daily/{}", env!("CARGO_PKG_VERSION"))
}

/// Root of the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    /// Category assigned when no keyword matches.
    pub default_category: String,
    /// Category forced for research-paper sources.
    pub research_category: String,
    /// Source names whose articles skip scoring and go to `research_category`.
    #[serde(default)]
    pub research_sources: Vec<String>,
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Number of sources fetched at once; 1 is strictly sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    pub categories: Vec<CategoryDefinition>,
}

impl NewsConfig {
    /// Parse and validate a YAML configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: NewsConfig = serde_yaml::from_str(yaml)?;
        for category in &mut config.categories {
            category.keywords = category
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
        }
        config.validate()?;
        Ok(config)
    }

    /// The configuration compiled into the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_CONFIG)
    }

    /// Load from `path` when given, otherwise fall back to the built-in config.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| ConfigError::Io {
                        path: path.display().to_string(),
                        source,
                    })?;
                Self::from_yaml(&yaml)?
            }
            None => Self::builtin()?,
        };
        info!(
            categories = config.categories.len(),
            sources = config.sources().count(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// All sources in configured order: category order, then source order.
    pub fn sources(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.categories.iter().flat_map(|c| c.sources.iter())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid("no categories configured".into()));
        }

        let mut keys = HashSet::new();
        for category in &self.categories {
            if category.key.trim().is_empty() {
                return Err(ConfigError::Invalid("category with empty key".into()));
            }
            if !keys.insert(category.key.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate category key `{}`",
                    category.key
                )));
            }
            for source in &category.sources {
                if source.limit == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "source `{}` has a zero limit",
                        source.name
                    )));
                }
                if source.kind != SourceKind::Social && source.endpoint.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "source `{}` has no endpoint",
                        source.name
                    )));
                }
            }
        }

        for (role, key) in [
            ("default_category", &self.default_category),
            ("research_category", &self.research_category),
        ] {
            if !keys.contains(key.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "{role} `{key}` is not a configured category"
                )));
            }
        }

        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
default_category: industry
research_category: research
research_sources: ["arXiv cs.AI"]
categories:
  - key: research
    name: Research
    keywords: ["Paper", " arxiv "]
  - key: industry
    name: Industry
    sources:
      - name: Example
        kind: feed
        endpoint: https://example.com/rss
"#;

    #[test]
    fn test_builtin_config_is_valid() {
        let config = NewsConfig::builtin().unwrap();
        assert!(!config.categories.is_empty());
        assert!(config.sources().count() > 0);
        assert!(config
            .categories
            .iter()
            .flat_map(|c| c.keywords.iter())
            .all(|k| k == &k.to_lowercase()));
    }

    #[test]
    fn test_defaults_and_keyword_normalization() {
        let config = NewsConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.summary_max_chars, 200);
        assert_eq!(config.request_timeout_secs, 20);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.categories[0].keywords, vec!["paper", "arxiv"]);
        let source = &config.categories[1].sources[0];
        assert_eq!(source.limit, 10);
        assert_eq!(source.kind, SourceKind::Feed);
        assert_eq!(config.research_sources, vec!["arXiv cs.AI"]);
    }

    #[test]
    fn test_unknown_default_category_is_rejected() {
        let yaml = MINIMAL.replace("default_category: industry", "default_category: misc");
        let err = NewsConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("misc")));
    }

    #[test]
    fn test_duplicate_category_key_is_rejected() {
        let yaml = MINIMAL.replace("key: research", "key: industry");
        assert!(matches!(
            NewsConfig::from_yaml(&yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_source_kind_is_a_yaml_error() {
        let yaml = MINIMAL.replace("kind: feed", "kind: carrier_pigeon");
        assert!(matches!(
            NewsConfig::from_yaml(&yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file_reports_path() {
        let err = NewsConfig::load(Some(Path::new("/nonexistent/news.yaml")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/news.yaml"));
    }
}
