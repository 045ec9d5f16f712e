//! Text translation client.

use crate::error::{Result, RevoiceError};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Trait for synchronous text translation.
///
/// No retry semantics: a single failed call fails the caller's stage.
#[async_trait::async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str)
    -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TranslatePayload {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// HTTP translation client (LibreTranslate-compatible wire shape).
pub struct HttpTranslationService {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpTranslationService {
    pub fn new(endpoint: &str, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_token,
        }
    }
}

#[async_trait::async_trait]
impl TranslationService for HttpTranslationService {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        let url = format!("{}/translate", self.endpoint);
        let mut request = self.client.post(url).json(&serde_json::json!({
            "q": text,
            "source": source_lang,
            "target": target_lang,
            "format": "text",
        }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| RevoiceError::Translation {
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(RevoiceError::Translation {
                message: format!("service returned status {}", response.status()),
            });
        }

        let payload: TranslatePayload =
            response.json().await.map_err(|e| RevoiceError::Translation {
                message: format!("malformed response: {e}"),
            })?;

        Ok(payload.translated_text)
    }
}

/// Phrase-table translation double for testing.
#[derive(Default)]
pub struct StaticTranslation {
    phrases: HashMap<String, String>,
    should_fail: bool,
    calls: AtomicU32,
}

impl StaticTranslation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of translate calls performed so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Map `source` text to `translated` text.
    pub fn with_phrase(mut self, source: &str, translated: &str) -> Self {
        self.phrases
            .insert(source.to_string(), translated.to_string());
        self
    }

    /// Configure every call to fail.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait::async_trait]
impl TranslationService for StaticTranslation {
    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(RevoiceError::Translation {
                message: "scripted translation failure".to_string(),
            });
        }
        Ok(self
            .phrases
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{target_lang}] {text}")))
    }
}
