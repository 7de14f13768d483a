//! `config.json` check: load the file and run the validator over it

use async_trait::async_trait;
use std::path::Path;

use super::RepositoryCheck;
use crate::config::load_config;
use crate::engine::{ConfigValidator, ProgressSink, RuleContext};
use crate::error::Result;

pub struct ConfigFileCheck {
    validator: ConfigValidator,
    context: RuleContext,
}

impl ConfigFileCheck {
    pub fn new(validator: ConfigValidator, context: RuleContext) -> Self {
        Self { validator, context }
    }

    pub fn context(&self) -> &RuleContext {
        &self.context
    }
}

#[async_trait]
impl RepositoryCheck for ConfigFileCheck {
    fn id(&self) -> &str {
        "config-file"
    }

    async fn run(&self, root: &Path, progress: &dyn ProgressSink) -> Result<()> {
        let config = load_config(&root.join(&self.context.relative_path))?;
        let report = self.validator.validate(&config, &self.context, progress).await?;

        tracing::debug!(
            rule_set = %report.rule_set,
            rules_evaluated = report.rules_evaluated,
            duration_ms = report.duration_ms,
            "Configuration validated"
        );
        Ok(())
    }
}
