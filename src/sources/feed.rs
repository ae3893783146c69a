//! RSS and Atom feed adapter.
//!
//! The root element decides the dialect: `<rss>` (RSS 2.0), `<RDF>` (RSS 1.0,
//! items are siblings of the channel) or `<feed>` (Atom). Entries are taken
//! in document order, which for every feed we read is newest first.

use crate::config::SourceDescriptor;
use crate::error::SourceError;
use crate::models::RawItem;
use crate::sources::{SourceAdapter, check_status};
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct FeedAdapter {
    client: Client,
}

impl FeedAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl SourceAdapter for FeedAdapter {
    #[instrument(level = "info", skip_all, fields(source = %source.name))]
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawItem>, SourceError> {
        let response = self.client.get(&source.endpoint).send().await?;
        let body = check_status(response)?.text().await?;
        debug!(bytes = body.len(), "Downloaded feed");

        let items = parse_feed(&body, source.limit)?;
        info!(count = items.len(), "Parsed feed entries");
        Ok(items)
    }
}

/// Element text, tolerant of attributes such as Atom's `type="html"`.
#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    text: String,
}

/// RSS `<category>` text or Atom `<category term="..."/>`.
#[derive(Debug, Default, Deserialize)]
struct CategoryNode {
    #[serde(rename = "$text", default)]
    text: String,
    #[serde(rename = "@term", default)]
    term: Option<String>,
}

impl CategoryNode {
    fn into_tag(self) -> String {
        self.term.unwrap_or(self.text)
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

/// RSS 1.0: items live next to the channel, not inside it.
#[derive(Debug, Deserialize)]
struct Rdf {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

/// RSS `<link>` text, or the `href` of a namespaced `<atom:link/>`.
#[derive(Debug, Default, Deserialize)]
struct LinkNode {
    #[serde(rename = "$text", default)]
    text: String,
    #[serde(rename = "@href", default)]
    href: Option<String>,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

/// Fields are matched by local name, so `<media:title>`, `<atom:link>` and
/// friends land next to the plain RSS elements. Repeatable fields absorb them.
#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(rename = "title", default)]
    titles: Vec<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<LinkNode>,
    guid: Option<TextNode>,
    #[serde(rename = "pubDate")]
    pub_date: Option<TextNode>,
    /// `dc:date` in RSS 1.0 feeds.
    #[serde(alias = "dc:date")]
    date: Option<TextNode>,
    #[serde(rename = "description", default)]
    descriptions: Vec<TextNode>,
    #[serde(rename = "category", default)]
    categories: Vec<CategoryNode>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(rename = "title", default)]
    titles: Vec<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    id: Option<TextNode>,
    published: Option<TextNode>,
    updated: Option<TextNode>,
    #[serde(rename = "summary", default)]
    summaries: Vec<TextNode>,
    /// `<media:content url=".."/>` shares the local name and carries no text.
    #[serde(rename = "content", default)]
    contents: Vec<TextNode>,
    #[serde(rename = "category", default)]
    categories: Vec<CategoryNode>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

fn text(node: Option<TextNode>) -> Option<String> {
    node.map(|n| n.text.trim().to_string()).filter(|t| !t.is_empty())
}

/// First non-empty text among repeated elements, in document order.
fn first_text(nodes: Vec<TextNode>) -> Option<String> {
    nodes.into_iter().find_map(|n| text(Some(n)))
}

fn rss_link(links: Vec<LinkNode>) -> Option<String> {
    let plain = links
        .iter()
        .map(|l| l.text.trim())
        .find(|t| !t.is_empty())
        .map(str::to_string);
    plain.or_else(|| {
        links
            .into_iter()
            .filter(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .filter_map(|l| l.href)
            .map(|h| h.trim().to_string())
            .find(|h| !h.is_empty())
    })
}

impl From<RssItem> for RawItem {
    fn from(item: RssItem) -> Self {
        let guid = text(item.guid).filter(|g| g.starts_with("http"));
        RawItem {
            title: first_text(item.titles),
            link: rss_link(item.links).or(guid),
            published: text(item.pub_date),
            updated: text(item.date),
            summary: first_text(item.descriptions),
            tags: item.categories.into_iter().map(CategoryNode::into_tag).collect(),
            ..Default::default()
        }
    }
}

impl From<AtomEntry> for RawItem {
    fn from(entry: AtomEntry) -> Self {
        // rel="alternate" is the permalink; a link without rel means the same
        let link = entry
            .links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| entry.links.first())
            .map(|l| l.href.clone())
            .filter(|h| !h.is_empty())
            .or_else(|| text(entry.id).filter(|id| id.starts_with("http")));
        RawItem {
            title: first_text(entry.titles),
            link,
            published: text(entry.published),
            updated: text(entry.updated),
            summary: first_text(entry.summaries).or_else(|| first_text(entry.contents)),
            tags: entry.categories.into_iter().map(CategoryNode::into_tag).collect(),
            ..Default::default()
        }
    }
}

/// Local name of the document's root element.
fn root_element(xml: &str) -> Result<String, SourceError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::Eof => return Err(SourceError::Format("empty document".into())),
            _ => {}
        }
    }
}

/// Parse a syndication document into at most `limit` raw items.
///
/// # Errors
///
/// [`SourceError::Format`] for a document that is not RSS or Atom, and XML
/// errors for malformed markup.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<RawItem>, SourceError> {
    let root = root_element(xml)?;
    let items: Vec<RawItem> = match root.as_str() {
        "rss" => {
            let rss: Rss = quick_xml::de::from_str(xml)?;
            rss.channel.items.into_iter().take(limit).map(RawItem::from).collect()
        }
        "RDF" => {
            let rdf: Rdf = quick_xml::de::from_str(xml)?;
            rdf.items.into_iter().take(limit).map(RawItem::from).collect()
        }
        "feed" => {
            let feed: AtomFeed = quick_xml::de::from_str(xml)?;
            feed.entries.into_iter().take(limit).map(RawItem::from).collect()
        }
        other => return Err(SourceError::Format(format!("root element <{other}>"))),
    };
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>AI Blog</title>
    <link>https://blog.example.com</link>
    <item>
      <title>Introducing a new open model</title>
      <link>https://blog.example.com/open-model</link>
      <pubDate>Thu, 15 Oct 2026 09:30:00 GMT</pubDate>
      <description><![CDATA[<p>Weights are on <b>GitHub</b>.</p>]]></description>
      <category>Models</category>
      <category domain="tags">Open Source</category>
    </item>
    <item>
      <title>Second &amp; older post</title>
      <guid>https://blog.example.com/older</guid>
      <pubDate>Wed, 14 Oct 2026 09:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Third post</title>
      <link>https://blog.example.com/third</link>
    </item>
  </channel>
</rss>"#;

    const SAMPLE_ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Papers</title>
  <id>urn:feed</id>
  <entry>
    <title type="html">A study of attention</title>
    <link rel="related" href="https://example.org/pdf/1"/>
    <link rel="alternate" href="https://example.org/abs/1"/>
    <id>urn:paper:1</id>
    <published>2026-10-15T08:00:00Z</published>
    <updated>2026-10-15T09:00:00Z</updated>
    <summary>We study attention.</summary>
    <category term="cs.AI"/>
  </entry>
  <entry>
    <title>No summary entry</title>
    <link href="https://example.org/abs/2"/>
    <updated>2026-10-14T09:00:00Z</updated>
    <content type="html">&lt;p&gt;Body text&lt;/p&gt;</content>
  </entry>
</feed>"#;

    const SAMPLE_RDF: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel rdf:about="https://example.net/">
    <title>RDF feed</title>
  </channel>
  <item rdf:about="https://example.net/1">
    <title>RDF item</title>
    <link>https://example.net/1</link>
    <dc:date>2026-10-15T08:00:00Z</dc:date>
  </item>
</rdf:RDF>"#;

    #[test]
    fn parses_rss_items_in_order() {
        let items = parse_feed(SAMPLE_RSS, 10).expect("valid RSS");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title.as_deref(), Some("Introducing a new open model"));
        assert_eq!(items[0].link.as_deref(), Some("https://blog.example.com/open-model"));
        assert_eq!(
            items[0].published.as_deref(),
            Some("Thu, 15 Oct 2026 09:30:00 GMT")
        );
        assert!(items[0].summary.as_deref().unwrap().contains("GitHub"));
        assert_eq!(items[0].tags, vec!["Models", "Open Source"]);
        assert_eq!(items[1].title.as_deref(), Some("Second & older post"));
        assert_eq!(items[1].link.as_deref(), Some("https://blog.example.com/older"));
    }

    #[test]
    fn respects_limit() {
        let items = parse_feed(SAMPLE_RSS, 2).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn parses_atom_entries() {
        let items = parse_feed(SAMPLE_ATOM, 10).expect("valid Atom");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link.as_deref(), Some("https://example.org/abs/1"));
        assert_eq!(items[0].published.as_deref(), Some("2026-10-15T08:00:00Z"));
        assert_eq!(items[0].summary.as_deref(), Some("We study attention."));
        assert_eq!(items[0].tags, vec!["cs.AI"]);
        assert_eq!(items[1].link.as_deref(), Some("https://example.org/abs/2"));
        assert_eq!(items[1].summary.as_deref(), Some("<p>Body text</p>"));
    }

    #[test]
    fn parses_rdf_items() {
        let items = parse_feed(SAMPLE_RDF, 10).expect("valid RDF");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link.as_deref(), Some("https://example.net/1"));
        assert_eq!(items[0].updated.as_deref(), Some("2026-10-15T08:00:00Z"));
    }

    #[test]
    fn namespaced_siblings_do_not_break_rss_items() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Media feed</title>
    <atom:link href="https://media.example.com/rss" rel="self" type="application/rss+xml"/>
    <item>
      <title>Plain title</title>
      <media:title type="plain">Media title</media:title>
      <link>https://media.example.com/a</link>
      <atom:link href="https://media.example.com/a-alt" rel="alternate"/>
      <description>Body</description>
      <media:description>Media body</media:description>
    </item>
    <item>
      <media:title>Only media title</media:title>
      <atom:link href="https://media.example.com/self" rel="self"/>
      <atom:link href="https://media.example.com/b" rel="alternate"/>
    </item>
  </channel>
</rss>"#;
        let items = parse_feed(xml, 10).expect("namespaced RSS");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Plain title"));
        assert_eq!(items[0].link.as_deref(), Some("https://media.example.com/a"));
        assert_eq!(items[0].summary.as_deref(), Some("Body"));
        assert_eq!(items[1].title.as_deref(), Some("Only media title"));
        assert_eq!(items[1].link.as_deref(), Some("https://media.example.com/b"));
    }

    #[test]
    fn media_content_does_not_break_atom_entries() {
        let xml = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <entry>
    <title>Video post</title>
    <media:title>Video post (media)</media:title>
    <link href="https://v.example.com/1"/>
    <media:content url="https://v.example.com/1.mp4" type="video/mp4"/>
    <content type="html">Watch it</content>
  </entry>
</feed>"#;
        let items = parse_feed(xml, 10).expect("namespaced Atom");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("Video post"));
        assert_eq!(items[0].summary.as_deref(), Some("Watch it"));
    }

    #[test]
    fn empty_channel_returns_empty_vec() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title></channel></rss>"#;
        assert!(parse_feed(xml, 10).unwrap().is_empty());
    }

    #[test]
    fn html_page_is_not_a_feed() {
        let result = parse_feed("<html><body>nope</body></html>", 10);
        assert!(matches!(result, Err(SourceError::Format(_))));
    }

    #[tokio::test]
    async fn fetch_reads_feed_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_RSS))
            .mount(&server)
            .await;

        let adapter = FeedAdapter::new(Client::new());
        let source = descriptor(&format!("{}/rss.xml", server.uri()));
        let items = adapter.fetch(&source).await.unwrap();
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn fetch_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let adapter = FeedAdapter::new(Client::new());
        let source = descriptor(&format!("{}/rss.xml", server.uri()));
        let err = adapter.fetch(&source).await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 503, .. }));
    }

    fn descriptor(endpoint: &str) -> SourceDescriptor {
        serde_yaml::from_str(&format!(
            "name: Test Feed\nkind: feed\nendpoint: \"{endpoint}\"\n"
        ))
        .unwrap()
    }
}
