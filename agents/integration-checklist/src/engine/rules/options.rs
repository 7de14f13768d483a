//! Integration option descriptions

use async_trait::async_trait;
use serde_json::Value;

use super::{Rule, RuleContext};
use crate::config::{display_value, is_truthy, ConfigTree};
use crate::error::{ChecklistError, Result};

/// Every entry of `options` needs a non-empty `description`
pub struct OptionDescriptionsRule;

impl OptionDescriptionsRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OptionDescriptionsRule {
    fn default() -> Self {
        Self::new()
    }
}

fn option_name(option: &Value) -> String {
    match option.get("name") {
        Some(name) => display_value(name),
        None => "(unnamed)".to_string(),
    }
}

#[async_trait]
impl Rule for OptionDescriptionsRule {
    fn id(&self) -> &str {
        "option-descriptions"
    }

    fn name(&self) -> &str {
        "Integration Option Descriptions"
    }

    async fn evaluate(&self, config: &ConfigTree, context: &RuleContext) -> Result<String> {
        let file = context.file_name();

        let options = match config.get("options") {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(options)) => options.as_slice(),
            Some(_) => {
                return Err(ChecklistError::config_invalid(format!(
                    "Config `options` in {} must be a list of integration options\n\n{}",
                    file,
                    context.fix("Change `options` to an array in")
                )))
            }
        };

        if let Some(option) = options
            .iter()
            .find(|option| !option.get("description").map(is_truthy).unwrap_or(false))
        {
            let name = option_name(option);
            return Err(ChecklistError::config_invalid(format!(
                "Config Integration Option {} in {} does not have a description\n\n{}",
                name,
                file,
                context.fix(&format!("Add a `description` to option `{}` in", name))
            )));
        }

        Ok(format!(
            "Config Integration Options all have descriptions in {}",
            file
        ))
    }
}
