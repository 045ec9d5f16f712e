//! Data types for the batch translation pipeline.

use std::path::{Path, PathBuf};

/// One local audio file discovered at batch start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Full local path.
    pub path: PathBuf,
    /// File name including extension, e.g. `greeting.mp3`.
    pub file_name: String,
    /// File name minus extension, e.g. `greeting`.
    pub base_name: String,
}

impl InputFile {
    /// Build an input file descriptor from a local path.
    ///
    /// Returns `None` when the path has no usable file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let base_name = match file_name.rsplit_once('.') {
            Some((base, _ext)) if !base.is_empty() => base.to_string(),
            _ => file_name.clone(),
        };
        Some(Self {
            path: path.to_path_buf(),
            file_name,
            base_name,
        })
    }
}

/// Stage a file has most recently completed (or `Failed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploaded,
    TranscriptionSubmitted,
    TranscriptionDone,
    Translated,
    Synthesized,
    Failed,
}

/// One file's progress through the pipeline.
///
/// Owned exclusively by the orchestrator while the file is processed and
/// discarded once the outcome is recorded; nothing is shared across files.
#[derive(Debug, Clone)]
pub struct PipelineJob {
    pub input: InputFile,
    pub target_language: String,
    pub stage: Stage,
    pub transcription_job: Option<String>,
    pub transcript: Option<String>,
    pub translation: Option<String>,
    pub audio: Option<Vec<u8>>,
}

impl PipelineJob {
    pub fn new(input: InputFile, target_language: &str) -> Self {
        Self {
            input,
            target_language: target_language.to_string(),
            stage: Stage::Uploaded,
            transcription_job: None,
            transcript: None,
            translation: None,
            audio: None,
        }
    }
}

/// Terminal classification of one file's run through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Succeeded,
    UploadFailed,
    TranscriptionFailed,
    TranscriptionTimeout,
    TranslationFailed,
    SynthesisFailed,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Succeeded)
    }

    /// Short operator-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Succeeded => "succeeded",
            FileOutcome::UploadFailed => "upload failed",
            FileOutcome::TranscriptionFailed => "transcription failed",
            FileOutcome::TranscriptionTimeout => "transcription timed out",
            FileOutcome::TranslationFailed => "translation failed",
            FileOutcome::SynthesisFailed => "synthesis failed",
        }
    }
}

/// Outcome of one file, as reported to the batch driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file_name: String,
    pub outcome: FileOutcome,
}

/// Aggregate of per-file results for a whole run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    reports: Vec<FileReport>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[FileReport] {
        &self.reports
    }

    pub fn succeeded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    /// Reports for files that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| !r.outcome.is_success())
    }
}
