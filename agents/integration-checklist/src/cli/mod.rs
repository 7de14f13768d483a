//! CLI module for the Integration Checklist

pub mod commands;
pub mod output;

pub use commands::{ChecklistCli, ChecklistCommands, LogFormat, RunArgs};
pub use output::{FailureTarget, OutputFormat};

use crate::checklist::ChecklistReport;
use crate::error::{ErrorKind, Result};

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every check passed
    Success = 0,
    /// A check failed
    CheckFailed = 1,
    /// Invalid arguments or settings
    InvalidInput = 3,
    /// A required file is missing
    FileMissing = 4,
    /// The hosting service could not be reached or refused the request
    UpstreamError = 5,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::ConfigInvalid | ErrorKind::FileInvalid => ExitCode::CheckFailed,
            ErrorKind::ConfigMissing | ErrorKind::FileMissing => ExitCode::FileMissing,
            ErrorKind::UpstreamFetchFailed => ExitCode::UpstreamError,
            ErrorKind::InvalidInput => ExitCode::InvalidInput,
            ErrorKind::Internal => ExitCode::InternalError,
        }
    }
}

impl ExitCode {
    /// Determine exit code from a checklist report
    pub fn from_report(report: &ChecklistReport) -> Self {
        match &report.failure {
            None => ExitCode::Success,
            Some(failure) => failure.kind.into(),
        }
    }
}

/// Run the CLI with the given arguments and return the exit code
pub async fn run(cli: ChecklistCli) -> Result<ExitCode> {
    match cli.command {
        ChecklistCommands::Run(args) => commands::execute_run(args).await,
        ChecklistCommands::ValidateConfig {
            root,
            config,
            rule_set,
            format,
        } => commands::execute_validate_config(root, config, rule_set, format).await,
        ChecklistCommands::RuleSets { format } => commands::execute_rule_sets(format),
    }
}
