//! CLI for the resfetch resilient fetcher.

mod commands;
mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use resfetch_core::config::{self, ResfetchConfig};

use commands::{run_completions, run_config, run_get, run_watch};

/// Top-level CLI for resfetch.
#[derive(Debug, Parser)]
#[command(name = "resfetch")]
#[command(about = "resfetch: fetch with retry, backoff and last-good-value fallback", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch once with retry; on failure fall back to the cached body if any.
    Get {
        /// URL, or a search term sent as `q=` to `base_url` from the config.
        target: String,
        /// Maximum attempts (including the first). Overrides the config.
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
        /// API key sent as `appid`. Overrides the config.
        #[arg(long)]
        key: Option<String>,
    },

    /// Re-fetch on an interval. Type a new API key on stdin to update it.
    Watch {
        /// URL, or a search term sent as `q=` to `base_url` from the config.
        target: String,
        /// Seconds between fetches.
        #[arg(long, default_value = "30", value_name = "SECS")]
        interval: u64,
        /// Maximum attempts (including the first). Overrides the config.
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
        /// API key sent as `appid`. Overrides the config.
        #[arg(long)]
        key: Option<String>,
    },

    /// Show the config file path and effective configuration.
    Config,

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Get {
                target,
                attempts,
                key,
            } => run_get(&load_config()?, &target, attempts, key).await?,
            CliCommand::Watch {
                target,
                interval,
                attempts,
                key,
            } => run_watch(&load_config()?, &target, interval, attempts, key).await?,
            CliCommand::Config => run_config(&load_config()?)?,
            // No config needed (and none written) just to print completions.
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

fn load_config() -> Result<ResfetchConfig> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests;
