//! Default color rule

use async_trait::async_trait;
use serde_json::Value;

use super::{Rule, RuleContext};
use crate::config::ConfigTree;
use crate::error::{ChecklistError, Result};

/// `defaultColor` must be set to something non-empty
pub struct DefaultColorRule;

impl DefaultColorRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultColorRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for DefaultColorRule {
    fn id(&self) -> &str {
        "default-color"
    }

    fn name(&self) -> &str {
        "Default Color"
    }

    async fn evaluate(&self, config: &ConfigTree, context: &RuleContext) -> Result<String> {
        let file = context.file_name();

        match config.get("defaultColor") {
            None | Some(Value::Null) => {}
            Some(Value::String(color)) if color.is_empty() => {}
            Some(_) => return Ok(format!("Config 'defaultColor' is set in {}", file)),
        }

        Err(ChecklistError::config_invalid(format!(
            "Default Color not defined in {}\n\n{}",
            file,
            context.fix("Add `\"defaultColor\": \"light-blue\"` to")
        )))
    }
}
