//! Configuration and connectivity report for the `check` command.

use crate::config::Config;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Print the resolved configuration and probe each service endpoint.
///
/// Reachability means the endpoint answered any HTTP response at all; only
/// transport-level failures count as unreachable. Never fails the process.
pub async fn run_check(config: &Config) {
    println!("revoice configuration:");
    println!(
        "  bucket:          {}",
        if config.storage.bucket.is_empty() {
            "(not set)".to_string()
        } else {
            config.storage.bucket.clone()
        }
    );
    println!("  region:          {}", config.storage.region);
    println!("  prefix:          {}", config.storage.prefix);
    println!("  input dir:       {}", config.pipeline.input_dir.display());
    println!("  target language: {}", config.pipeline.target_language);
    println!(
        "  voice:           {}",
        config.voice_for(&config.pipeline.target_language)
    );
    println!();

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("revoice: failed to build HTTP client: {e}");
            return;
        }
    };

    println!("service endpoints:");
    let endpoints = [
        ("storage", &config.services.storage_endpoint),
        ("transcribe", &config.services.transcribe_endpoint),
        ("translate", &config.services.translate_endpoint),
        ("speech", &config.services.speech_endpoint),
    ];
    for (name, endpoint) in endpoints {
        let status = if probe(&client, endpoint).await {
            format!("{}", "reachable".green())
        } else {
            format!("{}", "unreachable".red())
        };
        println!("  {name:12} {endpoint}  [{status}]");
    }
}

async fn probe(client: &reqwest::Client, endpoint: &str) -> bool {
    client.get(endpoint).send().await.is_ok()
}
