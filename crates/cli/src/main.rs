mod cli;
mod input;
mod run;
mod validate;

use anyhow::{Context, Result};
use clap::Parser;

use wowpulse_core::{load_dotenv, Config};

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    match args.command {
        Command::ValidateRules { file } => validate::validate_rules(&file),
        Command::Run(run_args) => run::run(load_config(args.profile.as_deref())?, run_args).await,
        Command::NotifyTest => run::notify_test(&load_config(args.profile.as_deref())?).await,
    }
}

fn load_config(profile: Option<&str>) -> Result<Config> {
    let config = Config::for_profile(profile.unwrap_or("")).context("failed to load configuration")?;
    config.log_summary();
    tracing::debug!(config = %config.redacted_summary(), "effective configuration");
    Ok(config)
}
