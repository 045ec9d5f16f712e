//! Asynchronous transcription job client.
//!
//! Transcription is the one external call that does not return its result
//! synchronously: a job is submitted, polled until it reaches a terminal
//! state, and the transcript is then fetched from the location the completed
//! job advertises.

use crate::error::{Result, RevoiceError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Opaque identifier for a submitted transcription job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(pub String);

/// Parameters for one transcription job submission.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TranscriptionRequest {
    pub job_name: String,
    pub media_uri: String,
    pub media_format: String,
    pub language_code: String,
}

/// State of a transcription job as reported by the service.
///
/// `Completed` and `Failed` are terminal; the service never moves a job out
/// of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    InProgress,
    Completed,
    Failed,
}

/// One polled snapshot of a transcription job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub state: JobState,
    /// Location of the transcript payload; set once the job completes.
    pub transcript_uri: Option<String>,
    /// Service-reported reason; set when the job fails.
    pub failure_reason: Option<String>,
}

impl JobStatus {
    pub fn in_progress() -> Self {
        Self {
            state: JobState::InProgress,
            transcript_uri: None,
            failure_reason: None,
        }
    }

    pub fn completed(transcript_uri: &str) -> Self {
        Self {
            state: JobState::Completed,
            transcript_uri: Some(transcript_uri.to_string()),
            failure_reason: None,
        }
    }

    pub fn failed(reason: &str) -> Self {
        Self {
            state: JobState::Failed,
            transcript_uri: None,
            failure_reason: Some(reason.to_string()),
        }
    }
}

/// Trait for the asynchronous transcription service.
///
/// This trait allows swapping implementations (real HTTP service vs scripted).
#[async_trait::async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Submit a new job. Job names must be unique within the service.
    async fn submit(&self, request: &TranscriptionRequest) -> Result<JobHandle>;

    /// Fetch the current status of a job.
    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus>;

    /// Retrieve the raw transcript payload from a completed job's location.
    async fn fetch_transcript(&self, uri: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TranscriptPayload {
    results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
struct TranscriptResults {
    transcripts: Vec<TranscriptEntry>,
}

#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    transcript: String,
}

/// Extract the transcript text from a retrieval payload.
///
/// The payload shape is fixed by the service contract: top-level `results`,
/// nested `transcripts` sequence, first element's `transcript` field.
pub fn parse_transcript(payload: &str) -> Result<String> {
    let parsed: TranscriptPayload =
        serde_json::from_str(payload).map_err(|e| RevoiceError::TranscriptRetrieval {
            message: format!("malformed transcript payload: {e}"),
        })?;

    parsed
        .results
        .transcripts
        .into_iter()
        .next()
        .map(|entry| entry.transcript)
        .ok_or_else(|| RevoiceError::TranscriptRetrieval {
            message: "payload has no transcripts".to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: String,
    transcript_uri: Option<String>,
    failure_reason: Option<String>,
}

/// HTTP transcription service client.
pub struct HttpTranscriptionService {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpTranscriptionService {
    pub fn new(endpoint: &str, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl TranscriptionService for HttpTranscriptionService {
    async fn submit(&self, request: &TranscriptionRequest) -> Result<JobHandle> {
        let url = format!("{}/v1/transcriptions", self.endpoint);
        let response = self
            .authorized(self.client.post(url).json(request))
            .send()
            .await
            .map_err(|e| RevoiceError::TranscriptionSubmit {
                job_name: request.job_name.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RevoiceError::TranscriptionSubmit {
                job_name: request.job_name.clone(),
                message: format!("service returned status {}", response.status()),
            });
        }

        Ok(JobHandle(request.job_name.clone()))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus> {
        let url = format!("{}/v1/transcriptions/{}", self.endpoint, handle.0);
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| RevoiceError::Other(format!("Failed to poll job {}: {e}", handle.0)))?;

        if !response.status().is_success() {
            return Err(RevoiceError::Other(format!(
                "Status poll for job {} returned {}",
                handle.0,
                response.status()
            )));
        }

        let payload: StatusPayload = response
            .json()
            .await
            .map_err(|e| RevoiceError::Other(format!("Malformed job status: {e}")))?;

        let state = match payload.status.as_str() {
            "IN_PROGRESS" | "QUEUED" => JobState::InProgress,
            "COMPLETED" => JobState::Completed,
            "FAILED" => JobState::Failed,
            other => {
                return Err(RevoiceError::Other(format!(
                    "Unknown job status for {}: {other}",
                    handle.0
                )));
            }
        };

        Ok(JobStatus {
            state,
            transcript_uri: payload.transcript_uri,
            failure_reason: payload.failure_reason,
        })
    }

    async fn fetch_transcript(&self, uri: &str) -> Result<String> {
        let response = self.authorized(self.client.get(uri)).send().await.map_err(|e| {
            RevoiceError::TranscriptRetrieval {
                message: format!("fetch from {uri} failed: {e}"),
            }
        })?;

        if !response.status().is_success() {
            return Err(RevoiceError::TranscriptRetrieval {
                message: format!("fetch from {uri} returned {}", response.status()),
            });
        }

        response
            .text()
            .await
            .map_err(|e| RevoiceError::TranscriptRetrieval {
                message: format!("failed to read transcript body: {e}"),
            })
    }
}

/// Scripted transcription service for testing.
///
/// Hands out a queued status per poll (an exhausted queue reports
/// `InProgress` forever) and serves canned transcript payloads by URI.
#[derive(Default)]
pub struct ScriptedTranscription {
    statuses: Mutex<VecDeque<JobStatus>>,
    payloads: Mutex<HashMap<String, String>>,
    default_payload: Option<String>,
    submitted: Mutex<Vec<TranscriptionRequest>>,
    polls: AtomicU32,
    fail_submit: bool,
}

impl ScriptedTranscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the statuses returned by successive polls.
    pub fn with_statuses(self, statuses: Vec<JobStatus>) -> Self {
        *self.statuses.lock().expect("status queue lock poisoned") = statuses.into();
        self
    }

    /// Serve `payload` for transcript fetches of `uri`.
    pub fn with_payload(self, uri: &str, payload: &str) -> Self {
        self.payloads
            .lock()
            .expect("payload map lock poisoned")
            .insert(uri.to_string(), payload.to_string());
        self
    }

    /// Serve `payload` for any transcript fetch without a specific entry.
    pub fn with_default_payload(mut self, payload: &str) -> Self {
        self.default_payload = Some(payload.to_string());
        self
    }

    /// Configure `submit` to fail.
    pub fn with_submit_failure(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    /// Number of polls performed so far.
    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    /// Requests received by `submit`, in order.
    pub fn submissions(&self) -> Vec<TranscriptionRequest> {
        self.submitted
            .lock()
            .expect("submission log lock poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl TranscriptionService for ScriptedTranscription {
    async fn submit(&self, request: &TranscriptionRequest) -> Result<JobHandle> {
        self.submitted
            .lock()
            .expect("submission log lock poisoned")
            .push(request.clone());

        if self.fail_submit {
            return Err(RevoiceError::TranscriptionSubmit {
                job_name: request.job_name.clone(),
                message: "scripted submit failure".to_string(),
            });
        }

        Ok(JobHandle(request.job_name.clone()))
    }

    async fn poll(&self, _handle: &JobHandle) -> Result<JobStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .expect("status queue lock poisoned")
            .pop_front()
            .unwrap_or_else(JobStatus::in_progress))
    }

    async fn fetch_transcript(&self, uri: &str) -> Result<String> {
        if let Some(payload) = self
            .payloads
            .lock()
            .expect("payload map lock poisoned")
            .get(uri)
        {
            return Ok(payload.clone());
        }
        self.default_payload
            .clone()
            .ok_or_else(|| RevoiceError::TranscriptRetrieval {
                message: format!("no payload scripted for {uri}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcript_round_trip() {
        let payload = r#"{"results":{"transcripts":[{"transcript":"hello world"}]}}"#;
        assert_eq!(parse_transcript(payload).unwrap(), "hello world");
    }

    #[test]
    fn test_parse_transcript_takes_first_entry() {
        let payload =
            r#"{"results":{"transcripts":[{"transcript":"first"},{"transcript":"second"}]}}"#;
        assert_eq!(parse_transcript(payload).unwrap(), "first");
    }

    #[test]
    fn test_parse_transcript_empty_sequence_errors() {
        let payload = r#"{"results":{"transcripts":[]}}"#;
        let err = parse_transcript(payload).unwrap_err();
        assert!(matches!(err, RevoiceError::TranscriptRetrieval { .. }));
    }

    #[test]
    fn test_parse_transcript_malformed_payload_errors() {
        let err = parse_transcript("not json").unwrap_err();
        assert!(matches!(err, RevoiceError::TranscriptRetrieval { .. }));

        let err = parse_transcript(r#"{"unexpected":true}"#).unwrap_err();
        assert!(matches!(err, RevoiceError::TranscriptRetrieval { .. }));
    }

    #[test]
    fn test_job_status_constructors() {
        assert_eq!(JobStatus::in_progress().state, JobState::InProgress);

        let done = JobStatus::completed("http://store/t.json");
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.transcript_uri.as_deref(), Some("http://store/t.json"));

        let failed = JobStatus::failed("bad media");
        assert_eq!(failed.state, JobState::Failed);
        assert_eq!(failed.failure_reason.as_deref(), Some("bad media"));
    }

    #[tokio::test]
    async fn test_scripted_statuses_are_consumed_in_order() {
        let service = ScriptedTranscription::new().with_statuses(vec![
            JobStatus::in_progress(),
            JobStatus::completed("uri"),
        ]);
        let handle = JobHandle("job".to_string());

        assert_eq!(service.poll(&handle).await.unwrap().state, JobState::InProgress);
        assert_eq!(service.poll(&handle).await.unwrap().state, JobState::Completed);
        assert_eq!(service.poll_count(), 2);
    }

    #[tokio::test]
    async fn test_scripted_exhausted_queue_stays_in_progress() {
        let service = ScriptedTranscription::new();
        let handle = JobHandle("job".to_string());

        for _ in 0..3 {
            assert_eq!(service.poll(&handle).await.unwrap().state, JobState::InProgress);
        }
    }

    #[tokio::test]
    async fn test_scripted_submit_failure() {
        let service = ScriptedTranscription::new().with_submit_failure();
        let request = TranscriptionRequest {
            job_name: "job".to_string(),
            media_uri: "mem://b/k".to_string(),
            media_format: "mp3".to_string(),
            language_code: "en".to_string(),
        };

        let err = service.submit(&request).await.unwrap_err();
        assert!(matches!(err, RevoiceError::TranscriptionSubmit { .. }));
        assert_eq!(service.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_payload_lookup_and_default() {
        let service = ScriptedTranscription::new()
            .with_payload("uri-a", "payload-a")
            .with_default_payload("fallback");

        assert_eq!(service.fetch_transcript("uri-a").await.unwrap(), "payload-a");
        assert_eq!(service.fetch_transcript("uri-b").await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_scripted_missing_payload_errors() {
        let service = ScriptedTranscription::new();
        let err = service.fetch_transcript("uri").await.unwrap_err();
        assert!(matches!(err, RevoiceError::TranscriptRetrieval { .. }));
    }
}
