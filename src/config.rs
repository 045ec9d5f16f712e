use crate::defaults;
use crate::error::{Result, RevoiceError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub pipeline: PipelineSettings,
    pub services: ServicesConfig,
    /// Per-language synthesis voice overrides (lang code → voice id).
    pub voices: HashMap<String, String>,
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Destination bucket for all artifacts. Required; there is no sane default.
    pub bucket: String,
    pub region: String,
    pub prefix: String,
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub source_language: String,
    pub target_language: String,
    pub media_format: String,
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServicesConfig {
    pub storage_endpoint: String,
    pub transcribe_endpoint: String,
    pub translate_endpoint: String,
    pub speech_endpoint: String,
    /// Sent as `Authorization: Bearer` on every service call when set.
    pub api_token: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: defaults::REGION.to_string(),
            prefix: defaults::PREFIX.to_string(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(defaults::INPUT_DIR),
            output_dir: PathBuf::from("."),
            source_language: defaults::SOURCE_LANGUAGE.to_string(),
            target_language: defaults::TARGET_LANGUAGE.to_string(),
            media_format: defaults::MEDIA_FORMAT.to_string(),
            poll_interval_secs: defaults::POLL_INTERVAL_SECS,
            max_poll_attempts: defaults::MAX_POLL_ATTEMPTS,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            storage_endpoint: "http://localhost:9000".to_string(),
            transcribe_endpoint: "http://localhost:8085".to_string(),
            translate_endpoint: "http://localhost:5000".to_string(),
            speech_endpoint: "http://localhost:8880".to_string(),
            api_token: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - REVOICE_BUCKET → storage.bucket
    /// - REVOICE_REGION → storage.region
    /// - REVOICE_PREFIX → storage.prefix
    /// - REVOICE_TARGET_LANGUAGE → pipeline.target_language
    /// - REVOICE_API_TOKEN → services.api_token
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bucket) = std::env::var("REVOICE_BUCKET")
            && !bucket.is_empty()
        {
            self.storage.bucket = bucket;
        }

        if let Ok(region) = std::env::var("REVOICE_REGION")
            && !region.is_empty()
        {
            self.storage.region = region;
        }

        if let Ok(prefix) = std::env::var("REVOICE_PREFIX")
            && !prefix.is_empty()
        {
            self.storage.prefix = prefix;
        }

        if let Ok(lang) = std::env::var("REVOICE_TARGET_LANGUAGE")
            && !lang.is_empty()
        {
            self.pipeline.target_language = lang;
        }

        if let Ok(token) = std::env::var("REVOICE_API_TOKEN")
            && !token.is_empty()
        {
            self.services.api_token = Some(token);
        }

        self
    }

    /// Check that every value the pipeline cannot run without is present.
    ///
    /// The bucket is the only such value; everything else has a usable default.
    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.is_empty() {
            return Err(RevoiceError::ConfigMissingValue {
                key: "storage.bucket".to_string(),
            });
        }
        Ok(())
    }

    /// Synthesis voice for a target language.
    ///
    /// The `[voices]` table wins over the built-in mapping.
    pub fn voice_for(&self, lang: &str) -> String {
        self.voices
            .get(lang)
            .cloned()
            .unwrap_or_else(|| defaults::voice_for_language(lang).to_string())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/revoice/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("revoice")
            .join("config.toml")
    }
}
