//! Integration Development Checklist
//!
//! A CI lint for integration repositories. It validates `config/config.json`
//! against a versioned rule set, checks that the repository carries the
//! required files, and checks that the package manifests are releasable.
//!
//! ## Architecture
//!
//! 1. **Config** (`config/`): loads `config.json` as a JSON tree and resolves
//!    the checklist's own settings from TOML, the CI environment and flags.
//!
//! 2. **Engine** (`engine/`): the ordered rule pipeline. Each rule returns
//!    a confirmation line or fails with a remediation message; the first
//!    failure ends the run.
//!
//! 3. **Client** (`client/`): GitHub contents and tags APIs, behind traits so
//!    everything above can run against fakes.
//!
//! 4. **Checks** (`checks/`): repository checks (config file, LICENSE,
//!    required files, package manifests).
//!
//! 5. **Checklist** (`checklist`): runs the checks in their fixed order and
//!    produces a report.
//!
//! 6. **CLI** (`cli/`): `run`, `validate-config` and `rule-sets`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use integration_checklist::{
//!     config::load_config, ConfigValidator, RuleContext, RuleSet, StdoutProgress,
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> integration_checklist::Result<()> {
//!     let config = load_config(Path::new("config/config.json"))?;
//!     let validator = ConfigValidator::new(RuleSet::default());
//!     validator
//!         .validate(&config, &RuleContext::default(), &StdoutProgress)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod checklist;
pub mod checks;
pub mod cli;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;

pub use checklist::{Checklist, ChecklistReport, FailureReport, RemoteServices};
pub use cli::{ChecklistCli, ChecklistCommands, ExitCode, OutputFormat};
pub use client::{
    GitHubClient, GitHubClientBuilder, ReleaseTagSource, RemoteFileFetcher, RepositoryRef,
};
pub use config::{ChecklistSettings, ConfigTree};
pub use engine::{
    BaseBranchSource, CollectingProgress, ConfigValidator, EntityType, MalformedBasePolicy,
    ProgressSink, Rule, RuleContext, RuleSet, RuleSetVersion, SilentProgress, StdoutProgress,
    ValidationReport,
};
pub use error::{ChecklistError, ErrorKind, Result};

/// Crate version (from Cargo.toml)
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the CLI application
///
/// This is the main entry point for the CLI binary.
pub async fn run_cli(cli: ChecklistCli) -> ExitCode {
    match cli::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.kind())
        }
    }
}
