//! Batch run entry point.
//!
//! Composition root: applies CLI overrides onto the configuration, builds the
//! HTTP service clients, and drives the whole input directory through the
//! pipeline.

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::batch::{discover_inputs, print_summary, run_batch};
use crate::pipeline::orchestrator::{FilePipeline, PipelineOptions};
use crate::services::speech::HttpSpeechSynthesizer;
use crate::services::storage::HttpObjectStore;
use crate::services::transcribe::HttpTranscriptionService;
use crate::services::translate::HttpTranslationService;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// CLI overrides applied on top of the loaded configuration.
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub input_dir: Option<PathBuf>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub target_lang: Option<String>,
    pub poll_interval_secs: Option<u64>,
}

/// Run the batch: discover inputs, process each file, report the summary.
///
/// Fatal errors (missing bucket, unreadable input directory) abort before any
/// file is processed; per-file failures are folded into the summary and never
/// change the process outcome.
pub async fn run_batch_command(
    mut config: Config,
    overrides: RunOverrides,
    quiet: bool,
    verbose: bool,
) -> Result<()> {
    // Apply CLI overrides
    if let Some(dir) = overrides.input_dir {
        config.pipeline.input_dir = dir;
    }
    if let Some(bucket) = overrides.bucket {
        config.storage.bucket = bucket;
    }
    if let Some(prefix) = overrides.prefix {
        config.storage.prefix = prefix;
    }
    if let Some(lang) = overrides.target_lang {
        config.pipeline.target_language = lang;
    }
    if let Some(secs) = overrides.poll_interval_secs {
        config.pipeline.poll_interval_secs = secs;
    }

    config.validate()?;

    if verbose {
        eprintln!(
            "revoice: bucket={} prefix={} target={} input_dir={}",
            config.storage.bucket,
            config.storage.prefix,
            config.pipeline.target_language,
            config.pipeline.input_dir.display()
        );
    }

    let extension = format!(".{}", config.pipeline.media_format);
    let inputs = discover_inputs(&config.pipeline.input_dir, &extension)?;
    if inputs.is_empty() {
        eprintln!(
            "revoice: no {extension} files found in {}",
            config.pipeline.input_dir.display()
        );
        return Ok(());
    }

    let pipeline = build_pipeline(&config, quiet);
    let summary = run_batch(&pipeline, &inputs, quiet).await;

    if !quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Wire the HTTP service clients and pipeline options from configuration.
pub fn build_pipeline(config: &Config, quiet: bool) -> FilePipeline {
    let token = config.services.api_token.clone();

    let store = Arc::new(HttpObjectStore::new(
        &config.services.storage_endpoint,
        token.clone(),
    ));
    let transcription = Arc::new(HttpTranscriptionService::new(
        &config.services.transcribe_endpoint,
        token.clone(),
    ));
    let translation = Arc::new(HttpTranslationService::new(
        &config.services.translate_endpoint,
        token.clone(),
    ));
    let synthesizer = Arc::new(HttpSpeechSynthesizer::new(
        &config.services.speech_endpoint,
        token,
    ));

    let options = PipelineOptions {
        bucket: config.storage.bucket.clone(),
        prefix: config.storage.prefix.clone(),
        source_language: config.pipeline.source_language.clone(),
        target_language: config.pipeline.target_language.clone(),
        media_format: config.pipeline.media_format.clone(),
        voice: config.voice_for(&config.pipeline.target_language),
        output_dir: config.pipeline.output_dir.clone(),
        poll_interval: Duration::from_secs(config.pipeline.poll_interval_secs),
        max_poll_attempts: config.pipeline.max_poll_attempts,
        quiet,
    };

    FilePipeline::new(store, transcription, translation, synthesizer, options)
}
