//! Integration Development Checklist CLI
//!
//! # Usage
//!
//! ```bash
//! # Run every check against the current directory
//! integration-checklist run
//!
//! # Compare the integration UUID against the develop branch
//! integration-checklist run --repository polarityio/example --base-branch develop
//!
//! # Validate only config.json with the v2 rules
//! integration-checklist validate-config --rule-set v2
//!
//! # Show the rule table
//! integration-checklist rule-sets
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success - every check passed
//! - 1: A check failed
//! - 3: Invalid input or arguments
//! - 4: Required file not found
//! - 5: Hosting service request failed
//! - 10: Internal error

use clap::Parser;
use integration_checklist::cli::LogFormat;
use integration_checklist::{run_cli, ChecklistCli};
use tracing_subscriber::EnvFilter;

fn init_tracing(cli: &ChecklistCli) {
    let level = if cli.quiet {
        tracing::Level::ERROR
    } else {
        match cli.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match cli.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = ChecklistCli::parse();
    init_tracing(&cli);

    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}
