//! Batch driver: enumerate input files and run each through the pipeline.

use crate::error::Result;
use crate::pipeline::orchestrator::FilePipeline;
use crate::pipeline::types::{BatchSummary, InputFile};
use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;

/// Discover pipeline inputs in `dir`.
///
/// A file qualifies when its name ends with `extension`, matched
/// case-sensitively against the exact suffix. Enumeration errors are fatal:
/// the run aborts before any file is processed. Results are sorted by file
/// name so operator output and reruns are stable.
pub fn discover_inputs(dir: &Path, extension: &str) -> Result<Vec<InputFile>> {
    let mut inputs: Vec<InputFile> = fs::read_dir(dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            let name = entry.file_name();
            let name = name.to_str()?;
            if !name.ends_with(extension) {
                return None;
            }
            InputFile::from_path(&path)
        })
        .collect();

    inputs.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(inputs)
}

/// Run every input through the pipeline, one file at a time.
///
/// One file is fully processed (all stages, including the blocking
/// transcription wait) before the next begins. A file's failure is recorded
/// in the summary and never stops the batch.
pub async fn run_batch(pipeline: &FilePipeline, inputs: &[InputFile], quiet: bool) -> BatchSummary {
    let mut summary = BatchSummary::new();

    for (index, input) in inputs.iter().enumerate() {
        if !quiet {
            eprintln!(
                "revoice: [{}/{}] processing {}",
                index + 1,
                inputs.len(),
                input.file_name
            );
        }

        let report = pipeline.process(input).await;

        if !quiet {
            eprintln!("revoice: {}: {}", report.file_name, report.outcome.label());
        }
        summary.record(report);
    }

    summary
}

/// Render the end-of-run summary block to stderr.
pub fn print_summary(summary: &BatchSummary) {
    eprintln!();
    eprintln!(
        "revoice: {} succeeded, {} failed ({} total)",
        summary.succeeded().green(),
        summary.failed().red(),
        summary.reports().len()
    );
    for report in summary.failures() {
        eprintln!(
            "revoice:   {} — {}",
            report.file_name,
            report.outcome.label().red()
        );
    }
}
