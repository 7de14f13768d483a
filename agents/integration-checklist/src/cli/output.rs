//! Output formatting for the checklist CLI
//!
//! Table output is what a developer reads in a CI log: the `- Success:` lines
//! are printed while checks run, followed by the verdict. JSON and YAML
//! print the whole [`ChecklistReport`] once the run is over.

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

use crate::checklist::ChecklistReport;
use crate::engine::RuleSet;
use crate::error::{ChecklistError, Result};

pub const START_BANNER: &str = "Starting Integration Development Checklist...";
pub const PASSED_BANNER: &str = "Integration Development Checklist Passed!";

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable lines with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Whether confirmations should stream to stdout while checks run
    pub fn streams_progress(&self) -> bool {
        matches!(self, OutputFormat::Table)
    }
}

/// Where a failure message goes in table mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureTarget {
    /// `::error::` workflow command on stdout
    GitHubActions,
    /// Plain message on stderr
    Stderr,
}

impl FailureTarget {
    /// Pick the target from the value of `GITHUB_ACTIONS`
    pub fn detect(github_actions: Option<&str>) -> Self {
        match github_actions {
            Some("true") => FailureTarget::GitHubActions,
            _ => FailureTarget::Stderr,
        }
    }
}

/// Escape a message for use as workflow command data
pub fn escape_annotation(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format a failure as a GitHub Actions error annotation
pub fn github_annotation(message: &str) -> String {
    format!("::error::{}", escape_annotation(message))
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| ChecklistError::Internal(format!("Serialization error: {}", e))),
        OutputFormat::Table => Err(ChecklistError::Internal(
            "Table output is not a serialization format".to_string(),
        )),
    }
}

/// Render the final verdict of a run
pub fn render_report(
    report: &ChecklistReport,
    format: OutputFormat,
    target: FailureTarget,
) -> Result<()> {
    if format != OutputFormat::Table {
        println!("{}", serialize(report, format)?);
        return Ok(());
    }

    match &report.failure {
        None => {
            println!("{}", PASSED_BANNER.green().bold());
        }
        Some(failure) => match target {
            FailureTarget::GitHubActions => {
                println!("{}", github_annotation(&failure.message));
            }
            FailureTarget::Stderr => {
                let mut stderr = io::stderr();
                writeln!(stderr, "{} {}", "Error:".red().bold(), failure.message).ok();
                stderr.flush().ok();
            }
        },
    }

    tracing::debug!(duration_ms = report.duration_ms, "Checklist finished");
    Ok(())
}

#[derive(Debug, Serialize)]
struct RuleSetRow {
    version: String,
    reject_unauthorized: String,
    allow_bare_ip: bool,
    reject_expandable_types: bool,
    #[serde(rename = "default")]
    is_default: bool,
}

impl From<&RuleSet> for RuleSetRow {
    fn from(rule_set: &RuleSet) -> Self {
        Self {
            version: rule_set.version.to_string(),
            reject_unauthorized: rule_set.reject_unauthorized.to_string(),
            allow_bare_ip: rule_set.allow_bare_ip,
            reject_expandable_types: rule_set.reject_expandable_types,
            is_default: *rule_set == RuleSet::default(),
        }
    }
}

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

/// Render the rule table
pub fn render_rule_sets(rule_sets: &[RuleSet], format: OutputFormat) -> Result<()> {
    let rows: Vec<RuleSetRow> = rule_sets.iter().map(RuleSetRow::from).collect();

    if format != OutputFormat::Table {
        println!("{}", serialize(&rows, format)?);
        return Ok(());
    }

    let mut stdout = io::stdout();
    writeln!(stdout, "{}", "Rule Sets".cyan().bold()).ok();
    writeln!(stdout, "{}", "=".repeat(60)).ok();
    writeln!(
        stdout,
        "{:<10} {:<20} {:<10} {}",
        "VERSION", "REJECTUNAUTHORIZED", "BARE IP", "EXPANDABLE RULE"
    )
    .ok();

    for row in &rows {
        let version = if row.is_default {
            format!("{} *", row.version).bold().to_string()
        } else {
            row.version.clone()
        };
        writeln!(
            stdout,
            "{:<10} {:<20} {:<10} {}",
            version,
            row.reject_unauthorized,
            yes_no(row.allow_bare_ip),
            yes_no(row.reject_expandable_types)
        )
        .ok();
    }

    writeln!(stdout).ok();
    writeln!(stdout, "{}", "* default".dimmed()).ok();
    stdout.flush().ok();
    Ok(())
}
