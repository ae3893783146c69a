//! Optional best-effort title translation.
//!
//! # Architecture
//!
//! - [`Translate`]: Core trait for async translation
//! - [`GoogleTranslate`]: Client for the public `translate_a/single` endpoint
//! - [`NoTranslation`]: The default; translation disabled
//!
//! Translation never fails a run. [`Translate::translate_or_original`] logs
//! the error and hands back the input text unchanged.

use crate::error::SourceError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Trait for async text translation.
pub trait Translate {
    /// Whether translation is enabled at all.
    fn enabled(&self) -> bool {
        true
    }

    /// Translate `text` into the configured target language.
    async fn translate(&self, text: &str) -> Result<String, SourceError>;

    /// Translate `text`, falling back to the original on any failure.
    async fn translate_or_original(&self, text: &str) -> String {
        match self.translate(text).await {
            Ok(translated) if !translated.trim().is_empty() => translated,
            Ok(_) => text.to_string(),
            Err(e) => {
                warn!(error = %e, "Translation failed; keeping original text");
                text.to_string()
            }
        }
    }
}

/// Translation disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranslation;

impl Translate for NoTranslation {
    fn enabled(&self) -> bool {
        false
    }

    async fn translate(&self, text: &str) -> Result<String, SourceError> {
        Ok(text.to_string())
    }
}

/// `None` behaves like [`NoTranslation`].
impl<T: Translate> Translate for Option<T> {
    fn enabled(&self) -> bool {
        self.as_ref().is_some_and(|t| t.enabled())
    }

    async fn translate(&self, text: &str) -> Result<String, SourceError> {
        match self {
            Some(inner) => inner.translate(text).await,
            None => Ok(text.to_string()),
        }
    }
}

/// Client for Google's unauthenticated `translate_a/single` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    client: Client,
    base_url: String,
    target: String,
}

impl GoogleTranslate {
    pub fn new(client: Client, target: impl Into<String>) -> Self {
        Self::with_base_url(client, target, "https://translate.googleapis.com")
    }

    pub fn with_base_url(
        client: Client,
        target: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            target: target.into(),
        }
    }
}

impl Translate for GoogleTranslate {
    #[instrument(level = "debug", skip_all, fields(target = %self.target))]
    async fn translate(&self, text: &str) -> Result<String, SourceError> {
        let t0 = Instant::now();
        let url = format!(
            "{}/translate_a/single?client=gtx&sl=auto&tl={}&dt=t&q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.target),
            urlencoding::encode(text)
        );
        let response = crate::sources::check_status(self.client.get(&url).send().await?)?;
        let body: Value = serde_json::from_str(&response.text().await?)?;
        let translated = extract_translation(&body).ok_or_else(|| {
            SourceError::Format(format!(
                "unexpected translation payload: {}",
                truncate_for_log(&body.to_string(), 120)
            ))
        })?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Translated text");
        Ok(translated)
    }
}

/// Join the translated segments of a `[[["seg", "orig", ...], ...], ...]` payload.
fn extract_translation(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let joined: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_translation_joins_segments() {
        let body = json!([[["你好，", "Hello, ", null], ["世界", "world", null]], null, "en"]);
        assert_eq!(extract_translation(&body).as_deref(), Some("你好，世界"));
        assert!(extract_translation(&json!({"error": 1})).is_none());
    }

    #[tokio::test]
    async fn test_translate_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("tl", "zh-CN"))
            .and(query_param("q", "New model"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[["新模型", "New model"]]])))
            .mount(&server)
            .await;

        let translator = GoogleTranslate::with_base_url(Client::new(), "zh-CN", server.uri());
        assert_eq!(translator.translate("New model").await.unwrap(), "新模型");
    }

    #[tokio::test]
    async fn test_failure_returns_original() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let translator = GoogleTranslate::with_base_url(Client::new(), "zh-CN", server.uri());
        assert_eq!(translator.translate_or_original("New model").await, "New model");
    }

    #[tokio::test]
    async fn test_no_translation_is_disabled() {
        assert!(!NoTranslation.enabled());
        assert_eq!(NoTranslation.translate_or_original("x").await, "x");
    }
}
