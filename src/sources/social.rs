//! Twitter/X search via the `bird` CLI.
//!
//! Runs `bird search --json --count <limit> <query>` as a subprocess and
//! decodes its JSON array. Different `bird` releases emit different payload
//! shapes (`id_str` vs `id`, `full_text` vs `text`, `user` vs `author`), so
//! every field is read through its known aliases.

use crate::config::SourceDescriptor;
use crate::error::SourceError;
use crate::models::{Author, Metrics, RawItem};
use crate::sources::SourceAdapter;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct SocialAdapter {
    program: String,
    timeout: Duration,
}

impl SocialAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("bird", timeout)
    }

    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id_str: Option<String>,
    id: Option<Value>,
    full_text: Option<String>,
    text: Option<String>,
    #[serde(alias = "createdAt")]
    created_at: Option<String>,
    user: Option<TweetUser>,
    author: Option<TweetUser>,
    entities: Option<Entities>,
    #[serde(alias = "likeCount", alias = "like_count")]
    favorite_count: Option<u64>,
    #[serde(alias = "retweetCount")]
    retweet_count: Option<u64>,
    #[serde(alias = "replyCount")]
    reply_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TweetUser {
    #[serde(alias = "username")]
    screen_name: Option<String>,
    name: Option<String>,
    #[serde(alias = "profileImageUrl")]
    profile_image_url_https: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Entities {
    #[serde(default)]
    hashtags: Vec<Hashtag>,
}

#[derive(Debug, Deserialize)]
struct Hashtag {
    text: String,
}

impl Tweet {
    fn post_id(&self) -> Option<String> {
        self.id_str.clone().or_else(|| match &self.id {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }
}

impl SourceAdapter for SocialAdapter {
    #[instrument(level = "info", skip_all, fields(source = %source.name))]
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawItem>, SourceError> {
        let query = source
            .query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| SourceError::Descriptor(format!("{} has no query", source.name)))?;

        let count = source.limit.to_string();
        let run = Command::new(&self.program)
            .args(["search", "--json", "--count", count.as_str(), query])
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| SourceError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| SourceError::Process(format!("{} could not be started: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Process(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        debug!(bytes = output.stdout.len(), "bird search returned");

        let items = parse_tweets(&output.stdout, source.limit)?;
        info!(count = items.len(), "Collected posts");
        Ok(items)
    }
}

/// Decode `bird --json` output into at most `limit` raw items.
///
/// Posts without any id are skipped since they cannot be deduplicated.
pub fn parse_tweets(json: &[u8], limit: usize) -> Result<Vec<RawItem>, SourceError> {
    let tweets: Vec<Tweet> = serde_json::from_slice(json)?;
    Ok(tweets
        .into_iter()
        .filter_map(tweet_to_item)
        .take(limit)
        .collect())
}

fn tweet_to_item(tweet: Tweet) -> Option<RawItem> {
    let post_id = tweet.post_id()?;
    let user = tweet.user.or(tweet.author);
    let username = user.as_ref().and_then(|u| u.screen_name.clone());
    let link = username
        .as_ref()
        .map(|name| format!("https://x.com/{name}/status/{post_id}"));

    let author = user.map(|u| Author {
        username: u.screen_name.unwrap_or_else(|| "unknown".to_string()),
        display_name: u.name.unwrap_or_else(|| "Anonymous".to_string()),
        avatar: u.profile_image_url_https,
    });

    let mut metrics = Metrics::new();
    metrics.insert("likes".to_string(), tweet.favorite_count.unwrap_or(0));
    metrics.insert("retweets".to_string(), tweet.retweet_count.unwrap_or(0));
    metrics.insert("replies".to_string(), tweet.reply_count.unwrap_or(0));

    Some(RawItem {
        text: tweet.full_text.or(tweet.text),
        link,
        post_id: Some(post_id),
        created_at: tweet.created_at,
        tags: tweet
            .entities
            .unwrap_or_default()
            .hashtags
            .into_iter()
            .map(|h| h.text)
            .collect(),
        author,
        metrics,
        ..Default::default()
    })
}
