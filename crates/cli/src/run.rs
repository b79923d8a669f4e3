//! `wowpulse run`: one batch in, one report out.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use wowpulse_compute::Engine;
use wowpulse_core::{Config, EngineConfig};
use wowpulse_notify::{Dispatcher, Notification};
use wowpulse_report::Report;
use wowpulse_rules::{default_rule_set, load_file, KpiRuleSet};

use crate::cli::RunArgs;
use crate::input::{parse_values, read_source};

pub async fn run(config: Config, args: RunArgs) -> Result<()> {
    let engine_config = match &args.config {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load engine config '{}'", path.display()))?,
        None => config.engine.clone(),
    };
    let rules = load_rules(&config, &args)?;
    let engine = Engine::new(engine_config, &rules).context("invalid engine configuration")?;

    let raw = read_source(&args.input).await?;
    let values = parse_values(&raw)?;
    let now = args.now.unwrap_or_else(Utc::now);

    let report = if args.legacy {
        engine.run_untagged(&values, now)
    } else {
        engine.run_tagged_json(&values, now)
    };

    print_report(&report, args.json)?;

    if args.notify {
        deliver(&config, &report, &engine.config().report_title).await?;
    }
    Ok(())
}

fn load_rules(config: &Config, args: &RunArgs) -> Result<KpiRuleSet> {
    match args.rules.as_ref().or(config.rules_path.as_ref()) {
        Some(path) => load_file(path)
            .with_context(|| format!("failed to load rules '{}'", path.display())),
        None => default_rule_set().context("built-in rule set is invalid"),
    }
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "summary": report.summary(),
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", report.rendered_text);
    }
    Ok(())
}

fn dispatcher(config: &Config) -> Result<Dispatcher> {
    Dispatcher::from_notify_config(&config.notify).context("invalid notification configuration")
}

/// Deliver the report through every configured channel. Failed deliveries
/// are logged by the dispatcher and do not fail the run.
async fn deliver(config: &Config, report: &Report, title: &str) -> Result<()> {
    let dispatcher = dispatcher(config)?;
    if dispatcher.is_empty() {
        warn!("--notify given but NOTIFY_WEBHOOK_URL is not set, skipping delivery");
        return Ok(());
    }

    let results = dispatcher
        .dispatch(&Notification::from_report(report, title))
        .await;
    let delivered = results.iter().filter(|r| r.success).count();
    info!(delivered, failed = results.len() - delivered, "report delivery finished");
    Ok(())
}

/// `wowpulse notify-test`: ping each configured channel once.
pub async fn notify_test(config: &Config) -> Result<()> {
    let dispatcher = dispatcher(config)?;
    if dispatcher.is_empty() {
        bail!("no notification channel configured (set NOTIFY_WEBHOOK_URL)");
    }

    let mut failed = 0;
    for index in 0..dispatcher.len() {
        match dispatcher.test_notify(index).await {
            Ok(()) => println!("channel {index}: ok"),
            Err(e) => {
                println!("channel {index}: {e}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} channel(s) failed", dispatcher.len());
    }
    Ok(())
}
