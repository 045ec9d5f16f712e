//! Batch translation pipeline.
//!
//! `types` holds the data model, `orchestrator` the per-file state machine,
//! `batch` the driver that sequences a directory of inputs through it.

pub mod batch;
pub mod orchestrator;
pub mod types;

pub use batch::{discover_inputs, print_summary, run_batch};
pub use orchestrator::{Delay, FilePipeline, PipelineOptions, TokioDelay};
pub use types::{BatchSummary, FileOutcome, FileReport, InputFile, PipelineJob, Stage};
