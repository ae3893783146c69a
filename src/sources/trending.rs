//! Trending-repository listing scraper (GitHub trending page).
//!
//! Each repository is an `article.Box-row` block: the `h2 a` anchor holds the
//! `owner / name` title and link, the first `p` the optional description.
//! The page carries no publish time, so the normalizer stamps fetch time.
//!
//! Markup changes are expected. A page where nothing matches yields an empty
//! result rather than an error.

use crate::config::SourceDescriptor;
use crate::error::SourceError;
use crate::models::{Metrics, RawItem};
use crate::sources::{SourceAdapter, check_status};
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument, warn};
use url::Url;

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("article.Box-row").unwrap());
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("h2 a[href]").unwrap());
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static LANGUAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"span[itemprop="programmingLanguage"]"#).unwrap());
static STARGAZERS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href$="/stargazers"]"#).unwrap());
static STARS_TODAY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.float-sm-right").unwrap());

#[derive(Debug)]
pub struct TrendingAdapter {
    client: Client,
}

impl TrendingAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl SourceAdapter for TrendingAdapter {
    #[instrument(level = "info", skip_all, fields(source = %source.name))]
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawItem>, SourceError> {
        let base = Url::parse(&source.endpoint)
            .map_err(|e| SourceError::Descriptor(format!("{}: {e}", source.endpoint)))?;
        let html = check_status(self.client.get(base.clone()).send().await?)?
            .text()
            .await?;

        let items = parse_trending(&html, &base, source.limit);
        if items.is_empty() {
            warn!("No repository blocks matched; page layout may have changed");
        }
        info!(count = items.len(), "Scraped trending repositories");
        Ok(items)
    }
}

/// Extract at most `limit` repositories from a trending page.
pub fn parse_trending(html: &str, base: &Url, limit: usize) -> Vec<RawItem> {
    let document = Html::parse_document(html);
    document
        .select(&ROW)
        .filter_map(|row| parse_row(row, base))
        .take(limit)
        .collect()
}

fn parse_row(row: ElementRef<'_>, base: &Url) -> Option<RawItem> {
    let anchor = row.select(&TITLE_LINK).next()?;
    let href = anchor.value().attr("href")?;
    let link = base.join(href).ok()?;
    let title = collapse_whitespace(&element_text(anchor)).replace(" / ", "/");
    if title.is_empty() {
        return None;
    }

    let description = row
        .select(&DESCRIPTION)
        .next()
        .map(element_text)
        .map(|d| collapse_whitespace(&d))
        .filter(|d| !d.is_empty());

    let tags = row
        .select(&LANGUAGE)
        .next()
        .map(element_text)
        .map(|l| collapse_whitespace(&l))
        .filter(|l| !l.is_empty())
        .into_iter()
        .collect();

    let mut metrics = Metrics::new();
    metrics.insert(
        "stars".to_string(),
        row.select(&STARGAZERS)
            .next()
            .and_then(|e| parse_count(&element_text(e)))
            .unwrap_or(0),
    );
    metrics.insert(
        "stars_today".to_string(),
        row.select(&STARS_TODAY)
            .next()
            .and_then(|e| parse_count(&element_text(e)))
            .unwrap_or(0),
    );

    Some(RawItem {
        title: Some(title),
        link: Some(link.to_string()),
        summary: description,
        tags,
        metrics,
        ..Default::default()
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

/// First number in `text`, ignoring thousands separators: `"1,234 stars today"` → 1234.
fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text
        .split_whitespace()
        .find(|w| w.chars().next().is_some_and(|c| c.is_ascii_digit()))?
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_HTML: &str = r#"
<html><body>
<article class="Box-row">
  <h2 class="h3 lh-condensed">
    <a href="/acme/fast-llm" class="Link">
      <span class="text-normal">acme /</span>
      fast-llm
    </a>
  </h2>
  <p class="col-9 color-fg-muted my-1 pr-4">
    Blazing fast   LLM inference on GitHub
  </p>
  <div class="f6 color-fg-muted mt-2">
    <span itemprop="programmingLanguage">Rust</span>
    <a href="/acme/fast-llm/stargazers" class="Link">12,345</a>
    <span class="d-inline-block float-sm-right">1,024 stars today</span>
  </div>
</article>
<article class="Box-row">
  <h2 class="h3 lh-condensed">
    <a href="/someone/no-description">
      <span class="text-normal">someone /</span> no-description
    </a>
  </h2>
</article>
</body></html>"#;

    fn base() -> Url {
        Url::parse("https://github.com/trending?since=daily").unwrap()
    }

    #[test]
    fn parses_repository_blocks() {
        let items = parse_trending(SAMPLE_HTML, &base(), 10);
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title.as_deref(), Some("acme/fast-llm"));
        assert_eq!(first.link.as_deref(), Some("https://github.com/acme/fast-llm"));
        assert_eq!(
            first.summary.as_deref(),
            Some("Blazing fast LLM inference on GitHub")
        );
        assert_eq!(first.tags, vec!["Rust"]);
        assert_eq!(first.metrics["stars"], 12345);
        assert_eq!(first.metrics["stars_today"], 1024);
    }

    #[test]
    fn tolerates_missing_description() {
        let items = parse_trending(SAMPLE_HTML, &base(), 10);
        let second = &items[1];
        assert_eq!(second.title.as_deref(), Some("someone/no-description"));
        assert!(second.summary.is_none());
        assert!(second.tags.is_empty());
        assert_eq!(second.metrics["stars"], 0);
    }

    #[test]
    fn respects_limit() {
        assert_eq!(parse_trending(SAMPLE_HTML, &base(), 1).len(), 1);
    }

    #[test]
    fn changed_markup_yields_empty_result() {
        let html = "<html><body><div class='repo'>nothing here</div></body></html>";
        assert!(parse_trending(html, &base(), 10).is_empty());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1,024 stars today"), Some(1024));
        assert_eq!(parse_count("  987 "), Some(987));
        assert_eq!(parse_count("stars"), None);
    }

    #[tokio::test]
    async fn fetch_scrapes_page_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_HTML))
            .mount(&server)
            .await;

        let adapter = TrendingAdapter::new(Client::new());
        let source: SourceDescriptor = serde_yaml::from_str(&format!(
            "name: GitHub Trending\nkind: trending\nendpoint: \"{}/trending\"\n",
            server.uri()
        ))
        .unwrap();
        let items = adapter.fetch(&source).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].link.as_deref(),
            Some(format!("{}/acme/fast-llm", server.uri()).as_str())
        );
    }
}
