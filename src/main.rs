use anyhow::Result;
use clap::{CommandFactory, Parser};
use revoice::app::{RunOverrides, run_batch_command};
use revoice::cli::{Cli, Commands};
use revoice::config::Config;
use revoice::diagnostics::run_check;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            let overrides = RunOverrides {
                input_dir: cli.input_dir,
                bucket: cli.bucket,
                prefix: cli.prefix,
                target_lang: cli.target_lang,
                poll_interval_secs: cli.poll_interval,
            };
            run_batch_command(config, overrides, cli.quiet, cli.verbose).await?;
        }
        Some(Commands::Check) => {
            let config = load_config(cli.config.as_deref())?;
            run_check(&config).await;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "revoice", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/revoice/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    Ok(config.with_env_overrides())
}
