//! Command-line interface for revoice
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Batch audio translation pipeline
#[derive(Parser, Debug)]
#[command(name = "revoice", version, about = "Batch audio translation pipeline")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory containing input audio files (default: audio_inputs)
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Destination bucket for all artifacts
    #[arg(long, value_name = "BUCKET")]
    pub bucket: Option<String>,

    /// Storage key prefix (default: beta)
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Target language code for translation and synthesis (default: es)
    #[arg(long, value_name = "LANG")]
    pub target_lang: Option<String>,

    /// Delay between transcription status polls (default: 10s). Examples: 10s, 2m
    #[arg(long, value_name = "DURATION", value_parser = parse_secs)]
    pub poll_interval: Option<u64>,
}

/// Parse a duration string into seconds.
///
/// Supports bare numbers (seconds) and any format accepted by `humantime`
/// (`10s`, `2m`, `1h30m`).
fn parse_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report resolved configuration and service reachability
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
