//! Speech synthesis client.

use crate::error::{Result, RevoiceError};
use std::sync::atomic::{AtomicU32, Ordering};

/// Trait for synchronous text-to-speech synthesis.
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` as audio bytes in `output_format` using `voice`.
    async fn synthesize(&self, text: &str, output_format: &str, voice: &str)
    -> Result<Vec<u8>>;
}

/// HTTP speech synthesis client.
pub struct HttpSpeechSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpSpeechSynthesizer {
    pub fn new(endpoint: &str, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_token,
        }
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        output_format: &str,
        voice: &str,
    ) -> Result<Vec<u8>> {
        let url = format!("{}/v1/audio/speech", self.endpoint);
        let mut request = self.client.post(url).json(&serde_json::json!({
            "input": text,
            "voice": voice,
            "response_format": output_format,
        }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| RevoiceError::Synthesis {
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(RevoiceError::Synthesis {
                message: format!("service returned status {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| RevoiceError::Synthesis {
            message: format!("failed to read audio body: {e}"),
        })?;

        if bytes.is_empty() {
            return Err(RevoiceError::Synthesis {
                message: "service returned empty audio".to_string(),
            });
        }

        Ok(bytes.to_vec())
    }
}

/// Fixed-output synthesis double for testing.
#[derive(Default)]
pub struct CannedSpeech {
    audio: Vec<u8>,
    should_fail: bool,
    calls: AtomicU32,
}

impl CannedSpeech {
    pub fn new(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            should_fail: false,
            calls: AtomicU32::new(0),
        }
    }

    /// Number of synthesize calls performed so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Configure every call to fail.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for CannedSpeech {
    async fn synthesize(
        &self,
        _text: &str,
        _output_format: &str,
        _voice: &str,
    ) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(RevoiceError::Synthesis {
                message: "scripted synthesis failure".to_string(),
            });
        }
        Ok(self.audio.clone())
    }
}
