use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Week-over-week KPI report generator.
///
/// Reads a batch of KPI, product and competitor records, compares the
/// current period against the previous one, and prints the report.
#[derive(Parser, Debug)]
#[command(name = "wowpulse", version, about = "Week-over-week KPI reports")]
pub struct CliArgs {
    /// Config profile (reads `{PROFILE}_{KEY}` before `{KEY}`)
    #[arg(long, global = true, env = "WOWPULSE_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the engine on one batch and print the report.
    Run(RunArgs),

    /// Check a rule document and print its errors and warnings.
    ValidateRules {
        /// Rule document (YAML)
        file: PathBuf,
    },

    /// Send a test message through every configured notification channel.
    NotifyTest,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Batch file (JSON array or JSON lines); `-` reads stdin
    #[arg(long, short)]
    pub input: String,

    /// Records carry no `kind` tag; classify them by shape and position
    #[arg(long)]
    pub legacy: bool,

    /// Engine config YAML (overrides the environment)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Rule document YAML (overrides RULES_PATH and the built-in rules)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Print the summary and full report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Deliver the report through the configured webhook
    #[arg(long)]
    pub notify: bool,

    /// Clock override (RFC 3339), for reproducible output
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_parse() {
        let args = CliArgs::try_parse_from([
            "wowpulse",
            "run",
            "--input",
            "-",
            "--legacy",
            "--json",
            "--now",
            "2026-03-02T00:30:00Z",
        ])
        .unwrap();
        let Command::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.input, "-");
        assert!(run.legacy && run.json && !run.notify);
        assert_eq!(run.now.unwrap().to_rfc3339(), "2026-03-02T00:30:00+00:00");
    }

    #[test]
    fn validate_rules_takes_a_path() {
        let args = CliArgs::try_parse_from(["wowpulse", "validate-rules", "rules.yml"]).unwrap();
        match args.command {
            Command::ValidateRules { file } => assert_eq!(file, PathBuf::from("rules.yml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_requires_input() {
        assert!(CliArgs::try_parse_from(["wowpulse", "run"]).is_err());
    }

    #[test]
    fn notify_test_takes_no_arguments() {
        let args = CliArgs::try_parse_from(["wowpulse", "--profile", "prod", "notify-test"]).unwrap();
        assert!(matches!(args.command, Command::NotifyTest));
        assert_eq!(args.profile.as_deref(), Some("prod"));
        assert!(CliArgs::try_parse_from(["wowpulse", "notify-test", "extra"]).is_err());
    }
}
