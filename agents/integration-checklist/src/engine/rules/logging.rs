//! Logging level rule

use async_trait::async_trait;
use serde_json::Value;

use super::{Rule, RuleContext};
use crate::config::{lookup, ConfigTree};
use crate::error::{ChecklistError, Result};

const REQUIRED_LEVEL: &str = "info";

/// `logging.level` must be exactly `"info"`
pub struct LoggingLevelRule;

impl LoggingLevelRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingLevelRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for LoggingLevelRule {
    fn id(&self) -> &str {
        "logging-level"
    }

    fn name(&self) -> &str {
        "Logging Level"
    }

    async fn evaluate(&self, config: &ConfigTree, context: &RuleContext) -> Result<String> {
        let file = context.file_name();

        match lookup(config, "logging.level") {
            None => Err(ChecklistError::config_invalid(format!(
                "Logging Level not defined in {}\n\n{}",
                file,
                context.fix("Add `\"logging\": { \"level\": \"info\" }` to")
            ))),
            Some(Value::String(level)) if level == REQUIRED_LEVEL => Ok(format!(
                "Config Logging Level set to '{}' in {}",
                REQUIRED_LEVEL, file
            )),
            Some(_) => Err(ChecklistError::config_invalid(format!(
                "Logging Level not set to '{}' in {}\n\n{}",
                REQUIRED_LEVEL,
                file,
                context.fix("Set `logging.level` to `info` in")
            ))),
        }
    }
}
