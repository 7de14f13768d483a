//! CLI command definitions for the Integration Checklist
//!
//! Clap-based commands for running the full checklist, validating a single
//! `config.json`, and listing the rule sets.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use super::output::{
    render_report, render_rule_sets, FailureTarget, OutputFormat, START_BANNER,
};
use super::ExitCode;
use crate::checklist::{Checklist, ChecklistReport, RemoteServices};
use crate::checks::ConfigFileCheck;
use crate::client::GitHubClientBuilder;
use crate::config::{ChecklistSettings, CONFIG_JSON_PATH};
use crate::engine::{
    ConfigValidator, MalformedBasePolicy, ProgressSink, RuleContext, RuleSet, RuleSetVersion,
    SilentProgress, StdoutProgress,
};
use crate::error::Result;

/// Integration Development Checklist
///
/// Lint an integration repository before it is merged: `config.json`
/// rules, required files and package manifests.
#[derive(Parser, Debug)]
#[command(name = "integration-checklist")]
#[command(about = "Integration Development Checklist - Lint integration repositories in CI", long_about = None)]
#[command(version)]
pub struct ChecklistCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: ChecklistCommands,
}

/// Log line format
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum ChecklistCommands {
    /// Run the full checklist against a repository
    Run(RunArgs),

    /// Validate a single config.json
    ///
    /// Runs only the configuration rules. Never contacts the hosting
    /// service, so UUID continuity is not checked.
    ValidateConfig {
        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Configuration file, relative to the root
        #[arg(short, long, default_value = CONFIG_JSON_PATH)]
        config: String,

        /// Rule set to validate against
        #[arg(long, value_enum, default_value_t = RuleSetVersion::V3)]
        rule_set: RuleSetVersion,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the available rule sets
    RuleSets {
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Repository root
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Settings file (defaults to .integration-checklist.toml in the root)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Rule set to validate config.json against
    #[arg(long, value_enum)]
    pub rule_set: Option<RuleSetVersion>,

    /// How to treat an unparseable config.json on the base branch
    #[arg(long, value_enum)]
    pub malformed_base_config: Option<MalformedBasePolicy>,

    /// Branch the change will be merged into
    #[arg(long)]
    pub base_branch: Option<String>,

    /// Hosted repository as owner/name
    #[arg(long)]
    pub repository: Option<String>,

    /// Skip every check that needs the hosting service
    #[arg(long)]
    pub offline: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl RunArgs {
    /// Overlay command-line flags on resolved settings
    pub fn apply_to(&self, mut settings: ChecklistSettings) -> ChecklistSettings {
        if let Some(rule_set) = self.rule_set {
            settings.rule_set = rule_set;
        }
        if let Some(policy) = self.malformed_base_config {
            settings.malformed_base_config = policy;
        }
        if let Some(branch) = &self.base_branch {
            settings.github.base_branch = Some(branch.clone());
        }
        if let Some(repository) = &self.repository {
            settings.github.repository = Some(repository.clone());
        }
        settings
    }
}

/// Build the hosting service clients from settings
pub fn remote_services(settings: &ChecklistSettings) -> Result<RemoteServices> {
    let client = Arc::new(
        GitHubClientBuilder::new()
            .api_url(settings.github.api_url.clone())
            .token(settings.github.token.clone())
            .timeout_ms(settings.github.timeout_ms)
            .build()?,
    );
    Ok(RemoteServices::new(client.clone(), client))
}

fn failure_target() -> FailureTarget {
    FailureTarget::detect(std::env::var("GITHUB_ACTIONS").ok().as_deref())
}

async fn run_and_render(checklist: &Checklist, format: OutputFormat) -> Result<ChecklistReport> {
    let progress: &dyn ProgressSink = if format.streams_progress() {
        println!("{}", START_BANNER);
        &StdoutProgress
    } else {
        &SilentProgress
    };

    let report = checklist.run(progress).await;
    render_report(&report, format, failure_target())?;
    Ok(report)
}

/// Execute the run command
pub async fn execute_run(args: RunArgs) -> Result<ExitCode> {
    let settings = ChecklistSettings::load(args.settings.as_deref(), &args.root)?.apply_env()?;
    let settings = args.apply_to(settings);
    tracing::debug!(?settings, "Resolved settings");

    let remote = if args.offline {
        tracing::info!("Offline mode, remote checks disabled");
        None
    } else {
        Some(remote_services(&settings)?)
    };

    let checklist = Checklist::standard(&args.root, &settings, remote)?;
    let report = run_and_render(&checklist, args.format).await?;
    Ok(ExitCode::from_report(&report))
}

/// Execute the validate-config command
pub async fn execute_validate_config(
    root: PathBuf,
    config: String,
    rule_set: RuleSetVersion,
    format: OutputFormat,
) -> Result<ExitCode> {
    let validator = ConfigValidator::new(RuleSet::for_version(rule_set));

    let mut checklist = Checklist::new(root);
    checklist.register(Box::new(ConfigFileCheck::new(
        validator,
        RuleContext::new(config),
    )));

    let report = run_and_render(&checklist, format).await?;
    Ok(ExitCode::from_report(&report))
}

/// Execute the rule-sets command
pub fn execute_rule_sets(format: OutputFormat) -> Result<ExitCode> {
    render_rule_sets(&RuleSet::all(), format)?;
    Ok(ExitCode::Success)
}
