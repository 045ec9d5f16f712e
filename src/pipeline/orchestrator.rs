//! File pipeline orchestrator: the five-stage state machine.
//!
//! Drives one input file through upload → transcription → translation →
//! synthesis, persisting every artifact to storage the moment it is produced
//! so partial progress survives a later stage's failure. Every stage error is
//! converted into the file's terminal outcome here; nothing propagates to the
//! batch loop.

use crate::artifact;
use crate::defaults;
use crate::error::{Result, RevoiceError};
use crate::pipeline::types::{FileOutcome, FileReport, InputFile, PipelineJob, Stage};
use crate::services::speech::SpeechSynthesizer;
use crate::services::storage::ObjectStore;
use crate::services::transcribe::{
    JobState, TranscriptionRequest, TranscriptionService, parse_transcript,
};
use crate::services::translate::TranslationService;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Trait abstracting the inter-poll sleep.
///
/// Allows substituting a counting no-op delay in tests.
#[async_trait::async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Real delay backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait::async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Options for one pipeline run, shared by every file in the batch.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub bucket: String,
    pub prefix: String,
    pub source_language: String,
    pub target_language: String,
    pub media_format: String,
    /// Synthesis voice bound to the target language.
    pub voice: String,
    /// Directory local artifact copies are written to.
    pub output_dir: PathBuf,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// Suppress per-stage progress messages.
    pub quiet: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: defaults::PREFIX.to_string(),
            source_language: defaults::SOURCE_LANGUAGE.to_string(),
            target_language: defaults::TARGET_LANGUAGE.to_string(),
            media_format: defaults::MEDIA_FORMAT.to_string(),
            voice: defaults::voice_for_language(defaults::TARGET_LANGUAGE).to_string(),
            output_dir: PathBuf::from("."),
            poll_interval: Duration::from_secs(defaults::POLL_INTERVAL_SECS),
            max_poll_attempts: defaults::MAX_POLL_ATTEMPTS,
            quiet: false,
        }
    }
}

/// Result of waiting on a transcription job.
enum TranscriptWait {
    /// Job completed; carries the extracted transcript text.
    Done(String),
    /// The poll budget ran out while the job was still in progress.
    TimedOut,
}

/// Pipeline for one file: upload → transcribe → translate → synthesize.
pub struct FilePipeline {
    store: Arc<dyn ObjectStore>,
    transcription: Arc<dyn TranscriptionService>,
    translation: Arc<dyn TranslationService>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    options: PipelineOptions,
    delay: Arc<dyn Delay>,
}

impl FilePipeline {
    /// Creates a pipeline over explicitly injected service handles.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        transcription: Arc<dyn TranscriptionService>,
        translation: Arc<dyn TranslationService>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store,
            transcription,
            translation,
            synthesizer,
            options,
            delay: Arc::new(TokioDelay),
        }
    }

    /// Sets a custom delay (for deterministic testing).
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Process one input file through all five stages.
    ///
    /// Never returns an error: every stage failure is logged with the file
    /// and stage context and folded into the report's outcome, so the caller
    /// can always continue with the next file.
    pub async fn process(&self, input: &InputFile) -> FileReport {
        let mut job = PipelineJob::new(input.clone(), &self.options.target_language);
        let outcome = self.drive(&mut job).await;
        FileReport {
            file_name: input.file_name.clone(),
            outcome,
        }
    }

    async fn drive(&self, job: &mut PipelineJob) -> FileOutcome {
        // Stage 1: upload the raw input audio.
        let input_key = artifact::input_key(&self.options.prefix, &job.input.file_name);
        if let Err(e) = self
            .store
            .put_file(&self.options.bucket, &input_key, &job.input.path)
            .await
        {
            self.report_failure(job, "upload", &e);
            job.stage = Stage::Failed;
            return FileOutcome::UploadFailed;
        }
        job.stage = Stage::Uploaded;
        self.progress(job, "uploaded input audio");

        // Stage 2: submit the transcription job and block until it resolves.
        let transcript = match self.submit_and_await(job, &input_key).await {
            Ok(TranscriptWait::Done(text)) => text,
            Ok(TranscriptWait::TimedOut) => {
                eprintln!(
                    "revoice: {}: transcription still in progress after {} polls, giving up",
                    job.input.file_name, self.options.max_poll_attempts
                );
                job.stage = Stage::Failed;
                return FileOutcome::TranscriptionTimeout;
            }
            Err(e) => {
                self.report_failure(job, "transcription", &e);
                job.stage = Stage::Failed;
                return FileOutcome::TranscriptionFailed;
            }
        };
        job.stage = Stage::TranscriptionDone;
        job.transcript = Some(transcript.clone());
        self.progress(job, "transcript ready");

        // Stage 3: persist the transcript, then translate it.
        let translated = match self.persist_transcript_and_translate(job, &transcript).await {
            Ok(text) => text,
            Err(e) => {
                self.report_failure(job, "translation", &e);
                job.stage = Stage::Failed;
                return FileOutcome::TranslationFailed;
            }
        };
        job.stage = Stage::Translated;
        job.translation = Some(translated.clone());
        self.progress(job, "translation ready");

        // Stage 4 + 5: persist the translation, synthesize and persist audio.
        if let Err(e) = self.persist_translation(job, &translated).await {
            self.report_failure(job, "translation", &e);
            job.stage = Stage::Failed;
            return FileOutcome::TranslationFailed;
        }

        match self.synthesize_and_persist(job, &translated).await {
            Ok(audio) => {
                job.stage = Stage::Synthesized;
                job.audio = Some(audio);
                self.progress(job, "synthesized audio persisted");
                FileOutcome::Succeeded
            }
            Err(e) => {
                self.report_failure(job, "synthesis", &e);
                job.stage = Stage::Failed;
                FileOutcome::SynthesisFailed
            }
        }
    }

    /// Submit the transcription job and poll it to a terminal state.
    ///
    /// The first poll is immediate; every `InProgress` status is followed by
    /// exactly one delay before the next poll. The loop ends on `Completed`,
    /// `Failed`, a poll transport error, or an exhausted poll budget.
    async fn submit_and_await(
        &self,
        job: &mut PipelineJob,
        input_key: &str,
    ) -> Result<TranscriptWait> {
        let media_uri = self.store.object_uri(&self.options.bucket, input_key);
        let job_name = artifact::job_name(&job.input.base_name, artifact::timestamp_token());
        let request = TranscriptionRequest {
            job_name: job_name.clone(),
            media_uri,
            media_format: self.options.media_format.clone(),
            language_code: self.options.source_language.clone(),
        };

        let handle = self.transcription.submit(&request).await?;
        job.transcription_job = Some(job_name.clone());
        job.stage = Stage::TranscriptionSubmitted;
        self.progress(job, "transcription job submitted");

        // A poll budget of zero would classify every job as timed out
        // without ever asking the service.
        let attempts = self.options.max_poll_attempts.max(1);
        for attempt in 1..=attempts {
            let status = self.transcription.poll(&handle).await?;
            match status.state {
                JobState::Completed => {
                    let uri = status.transcript_uri.ok_or_else(|| {
                        RevoiceError::TranscriptRetrieval {
                            message: format!(
                                "job {job_name} completed without a transcript location"
                            ),
                        }
                    })?;
                    let payload = self.transcription.fetch_transcript(&uri).await?;
                    return Ok(TranscriptWait::Done(parse_transcript(&payload)?));
                }
                JobState::Failed => {
                    return Err(RevoiceError::TranscriptionJobFailed {
                        job_name: job_name.clone(),
                        reason: status
                            .failure_reason
                            .unwrap_or_else(|| "no reason reported".to_string()),
                    });
                }
                JobState::InProgress if attempt < attempts => {
                    self.delay.wait(self.options.poll_interval).await;
                }
                JobState::InProgress => {}
            }
        }

        Ok(TranscriptWait::TimedOut)
    }

    async fn persist_transcript_and_translate(
        &self,
        job: &PipelineJob,
        transcript: &str,
    ) -> Result<String> {
        let local = self
            .options
            .output_dir
            .join(artifact::transcript_file_name(&job.input.base_name));
        tokio::fs::write(&local, transcript).await?;

        let key = artifact::transcript_key(&self.options.prefix, &job.input.base_name);
        self.store
            .put_bytes(
                &self.options.bucket,
                &key,
                transcript.as_bytes().to_vec(),
                "text/plain",
            )
            .await?;

        self.translation
            .translate(
                transcript,
                &self.options.source_language,
                &self.options.target_language,
            )
            .await
    }

    async fn persist_translation(&self, job: &PipelineJob, translated: &str) -> Result<()> {
        let local = self.options.output_dir.join(artifact::translation_file_name(
            &job.input.base_name,
            &self.options.target_language,
        ));
        tokio::fs::write(&local, translated).await?;

        let key = artifact::translation_key(
            &self.options.prefix,
            &job.input.base_name,
            &self.options.target_language,
        );
        self.store
            .put_bytes(
                &self.options.bucket,
                &key,
                translated.as_bytes().to_vec(),
                "text/plain",
            )
            .await
    }

    async fn synthesize_and_persist(
        &self,
        job: &PipelineJob,
        translated: &str,
    ) -> Result<Vec<u8>> {
        let audio = self
            .synthesizer
            .synthesize(translated, &self.options.media_format, &self.options.voice)
            .await?;

        let local = self.options.output_dir.join(artifact::output_audio_file_name(
            &job.input.base_name,
            &self.options.target_language,
        ));
        tokio::fs::write(&local, &audio).await?;

        let key = artifact::output_audio_key(
            &self.options.prefix,
            &job.input.base_name,
            &self.options.target_language,
        );
        self.store
            .put_bytes(&self.options.bucket, &key, audio.clone(), "audio/mpeg")
            .await?;

        Ok(audio)
    }

    fn progress(&self, job: &PipelineJob, message: &str) {
        if !self.options.quiet {
            eprintln!("revoice: {}: {message}", job.input.file_name);
        }
    }

    fn report_failure(&self, job: &PipelineJob, stage: &str, error: &RevoiceError) {
        eprintln!(
            "revoice: {}: {stage} stage failed: {error}",
            job.input.file_name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::speech::CannedSpeech;
    use crate::services::storage::MemoryObjectStore;
    use crate::services::transcribe::{JobStatus, ScriptedTranscription};
    use crate::services::translate::StaticTranslation;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;

    const PAYLOAD: &str = r#"{"results":{"transcripts":[{"transcript":"hello"}]}}"#;

    /// Counts waits instead of sleeping.
    #[derive(Default)]
    struct CountingDelay {
        waits: AtomicU32,
    }

    impl CountingDelay {
        fn count(&self) -> u32 {
            self.waits.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Delay for CountingDelay {
        async fn wait(&self, _duration: Duration) {
            self.waits.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        store: Arc<MemoryObjectStore>,
        transcription: Arc<ScriptedTranscription>,
        translation: Arc<StaticTranslation>,
        synthesizer: Arc<CannedSpeech>,
        delay: Arc<CountingDelay>,
        // Held for the lifetime of the test so the dirs stay on disk.
        _input_dir: TempDir,
        output_dir: TempDir,
        input: InputFile,
        pipeline: FilePipeline,
    }

    fn fixture(transcription: ScriptedTranscription, translation: StaticTranslation) -> Fixture {
        fixture_with(
            MemoryObjectStore::new(),
            transcription,
            translation,
            CannedSpeech::new(b"\x00\x01"),
            3,
        )
    }

    fn fixture_with(
        store: MemoryObjectStore,
        transcription: ScriptedTranscription,
        translation: StaticTranslation,
        synthesizer: CannedSpeech,
        max_poll_attempts: u32,
    ) -> Fixture {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        let path = input_dir.path().join("greeting.mp3");
        std::fs::write(&path, b"fake mp3 bytes").unwrap();
        let input = InputFile::from_path(&path).unwrap();

        let store = Arc::new(store);
        let transcription = Arc::new(transcription);
        let translation = Arc::new(translation);
        let synthesizer = Arc::new(synthesizer);
        let delay = Arc::new(CountingDelay::default());

        let options = PipelineOptions {
            bucket: "bucket".to_string(),
            target_language: "fr".to_string(),
            voice: "Celine".to_string(),
            output_dir: output_dir.path().to_path_buf(),
            poll_interval: Duration::from_secs(10),
            max_poll_attempts,
            quiet: true,
            ..PipelineOptions::default()
        };

        let pipeline = FilePipeline::new(
            store.clone(),
            transcription.clone(),
            translation.clone(),
            synthesizer.clone(),
            options,
        )
        .with_delay(delay.clone());

        Fixture {
            store,
            transcription,
            translation,
            synthesizer,
            delay,
            _input_dir: input_dir,
            output_dir,
            input,
            pipeline,
        }
    }

    #[tokio::test]
    async fn test_successful_run_persists_all_artifacts() {
        let fx = fixture(
            ScriptedTranscription::new()
                .with_statuses(vec![JobStatus::completed("uri")])
                .with_payload("uri", PAYLOAD),
            StaticTranslation::new().with_phrase("hello", "bonjour"),
        );

        let report = fx.pipeline.process(&fx.input).await;

        assert_eq!(report.outcome, FileOutcome::Succeeded);
        assert_eq!(
            fx.store.object("bucket", "beta/audio_inputs/greeting.mp3"),
            Some(b"fake mp3 bytes".to_vec())
        );
        assert_eq!(
            fx.store.object("bucket", "beta/transcripts/greeting.txt"),
            Some(b"hello".to_vec())
        );
        assert_eq!(
            fx.store.object("bucket", "beta/translations/greeting_fr.txt"),
            Some(b"bonjour".to_vec())
        );
        assert_eq!(
            fx.store.object("bucket", "beta/audio_outputs/greeting_fr.mp3"),
            Some(b"\x00\x01".to_vec())
        );
    }

    #[tokio::test]
    async fn test_successful_run_writes_local_artifacts() {
        let fx = fixture(
            ScriptedTranscription::new()
                .with_statuses(vec![JobStatus::completed("uri")])
                .with_payload("uri", PAYLOAD),
            StaticTranslation::new().with_phrase("hello", "bonjour"),
        );

        let report = fx.pipeline.process(&fx.input).await;
        assert_eq!(report.outcome, FileOutcome::Succeeded);

        let out = fx.output_dir.path();
        assert_eq!(
            std::fs::read_to_string(out.join("greeting.txt")).unwrap(),
            "hello"
        );
        assert_eq!(
            std::fs::read_to_string(out.join("greeting_fr.txt")).unwrap(),
            "bonjour"
        );
        assert_eq!(
            std::fs::read(out.join("greeting_fr.mp3")).unwrap(),
            b"\x00\x01"
        );
    }

    #[tokio::test]
    async fn test_poll_loop_delays_between_polls() {
        let fx = fixture(
            ScriptedTranscription::new()
                .with_statuses(vec![
                    JobStatus::in_progress(),
                    JobStatus::in_progress(),
                    JobStatus::completed("uri"),
                ])
                .with_payload("uri", PAYLOAD),
            StaticTranslation::new().with_phrase("hello", "bonjour"),
        );

        let report = fx.pipeline.process(&fx.input).await;

        assert_eq!(report.outcome, FileOutcome::Succeeded);
        assert_eq!(fx.transcription.poll_count(), 3);
        assert_eq!(fx.delay.count(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_poll_budget_is_timeout() {
        // Empty status queue: the scripted service stays in progress forever.
        let fx = fixture(ScriptedTranscription::new(), StaticTranslation::new());

        let report = fx.pipeline.process(&fx.input).await;

        assert_eq!(report.outcome, FileOutcome::TranscriptionTimeout);
        assert_eq!(fx.transcription.poll_count(), 3);
        // No delay after the final poll.
        assert_eq!(fx.delay.count(), 2);
        assert_eq!(fx.translation.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_short_circuits() {
        let fx = fixture_with(
            MemoryObjectStore::new().with_failure_for("audio_inputs"),
            ScriptedTranscription::new(),
            StaticTranslation::new(),
            CannedSpeech::new(b"\x00\x01"),
            3,
        );

        let report = fx.pipeline.process(&fx.input).await;

        assert_eq!(report.outcome, FileOutcome::UploadFailed);
        assert!(fx.transcription.submissions().is_empty());
        assert_eq!(fx.transcription.poll_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_job_skips_translation_and_synthesis() {
        let fx = fixture(
            ScriptedTranscription::new()
                .with_statuses(vec![JobStatus::failed("unsupported media format")]),
            StaticTranslation::new(),
        );

        let report = fx.pipeline.process(&fx.input).await;

        assert_eq!(report.outcome, FileOutcome::TranscriptionFailed);
        assert_eq!(fx.translation.call_count(), 0);
        assert_eq!(fx.synthesizer.call_count(), 0);
        // Only the input upload made it to storage.
        assert_eq!(fx.store.keys(), vec!["bucket/beta/audio_inputs/greeting.mp3"]);
    }

    #[tokio::test]
    async fn test_submit_failure_is_transcription_failed() {
        let fx = fixture(
            ScriptedTranscription::new().with_submit_failure(),
            StaticTranslation::new(),
        );

        let report = fx.pipeline.process(&fx.input).await;

        assert_eq!(report.outcome, FileOutcome::TranscriptionFailed);
        assert_eq!(fx.transcription.poll_count(), 0);
    }

    #[tokio::test]
    async fn test_translation_failure_keeps_transcript_artifacts() {
        let fx = fixture(
            ScriptedTranscription::new()
                .with_statuses(vec![JobStatus::completed("uri")])
                .with_payload("uri", PAYLOAD),
            StaticTranslation::new().with_failure(),
        );

        let report = fx.pipeline.process(&fx.input).await;

        assert_eq!(report.outcome, FileOutcome::TranslationFailed);
        // Transcript artifacts remain persisted.
        assert_eq!(
            fx.store.object("bucket", "beta/transcripts/greeting.txt"),
            Some(b"hello".to_vec())
        );
        assert!(
            fx.store
                .object("bucket", "beta/translations/greeting_fr.txt")
                .is_none()
        );
        assert_eq!(fx.synthesizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_keeps_translation_artifacts() {
        let fx = fixture_with(
            MemoryObjectStore::new(),
            ScriptedTranscription::new()
                .with_statuses(vec![JobStatus::completed("uri")])
                .with_payload("uri", PAYLOAD),
            StaticTranslation::new().with_phrase("hello", "bonjour"),
            CannedSpeech::new(b"\x00\x01").with_failure(),
            3,
        );

        let report = fx.pipeline.process(&fx.input).await;

        assert_eq!(report.outcome, FileOutcome::SynthesisFailed);
        assert_eq!(
            fx.store.object("bucket", "beta/translations/greeting_fr.txt"),
            Some(b"bonjour".to_vec())
        );
        assert!(
            fx.store
                .object("bucket", "beta/audio_outputs/greeting_fr.mp3")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_submission_carries_media_uri_and_unique_name() {
        let fx = fixture(
            ScriptedTranscription::new()
                .with_statuses(vec![JobStatus::completed("uri")])
                .with_payload("uri", PAYLOAD),
            StaticTranslation::new(),
        );

        fx.pipeline.process(&fx.input).await;

        let submissions = fx.transcription.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(
            submissions[0].media_uri,
            "mem://bucket/beta/audio_inputs/greeting.mp3"
        );
        assert!(submissions[0].job_name.starts_with("greeting-"));
        assert_eq!(submissions[0].media_format, "mp3");
        assert_eq!(submissions[0].language_code, "en");
    }

    #[tokio::test]
    async fn test_completed_without_location_is_transcription_failed() {
        let status = JobStatus {
            state: JobState::Completed,
            transcript_uri: None,
            failure_reason: None,
        };
        let fx = fixture(
            ScriptedTranscription::new().with_statuses(vec![status]),
            StaticTranslation::new(),
        );

        let report = fx.pipeline.process(&fx.input).await;
        assert_eq!(report.outcome, FileOutcome::TranscriptionFailed);
    }

    #[tokio::test]
    async fn test_zero_poll_budget_still_polls_once() {
        let fx = fixture_with(
            MemoryObjectStore::new(),
            ScriptedTranscription::new()
                .with_statuses(vec![JobStatus::completed("uri")])
                .with_payload("uri", PAYLOAD),
            StaticTranslation::new(),
            CannedSpeech::new(b"\x00\x01"),
            0,
        );

        let report = fx.pipeline.process(&fx.input).await;

        assert_eq!(report.outcome, FileOutcome::Succeeded);
        assert_eq!(fx.transcription.poll_count(), 1);
    }
}
