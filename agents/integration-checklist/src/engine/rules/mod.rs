//! Rule framework for configuration validation
//!
//! Each rule inspects one aspect of `config.json` and either returns a
//! confirmation line or fails with a remediation message.

pub mod default_color;
pub mod entity_types;
pub mod integration_uuid;
pub mod logging;
pub mod options;
pub mod request;

pub use default_color::DefaultColorRule;
pub use entity_types::{EntityTypeAllowListRule, ExpandableEntityTypeRule};
pub use integration_uuid::{UuidContinuityRule, UuidPresenceRule};
pub use logging::LoggingLevelRule;
pub use options::OptionDescriptionsRule;
pub use request::RequestDefaultsRule;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::ruleset::MalformedBasePolicy;
use crate::client::{RemoteFileFetcher, RepositoryRef};
use crate::config::{ConfigTree, CONFIG_JSON_PATH};
use crate::error::Result;

/// Where to find the previous version of the configuration file
#[derive(Clone)]
pub struct BaseBranchSource {
    pub fetcher: Arc<dyn RemoteFileFetcher>,
    pub repository: RepositoryRef,
    /// Branch the change will be merged into
    pub branch: String,
}

impl BaseBranchSource {
    pub fn new(
        fetcher: Arc<dyn RemoteFileFetcher>,
        repository: RepositoryRef,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            repository,
            branch: branch.into(),
        }
    }
}

impl fmt::Debug for BaseBranchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseBranchSource")
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .finish()
    }
}

/// Context provided to rules during evaluation
#[derive(Debug, Clone)]
pub struct RuleContext {
    /// Path of the configuration file relative to the repository root
    pub relative_path: String,
    pub base_branch: Option<BaseBranchSource>,
    pub malformed_base_policy: MalformedBasePolicy,
}

impl Default for RuleContext {
    fn default() -> Self {
        Self::new(CONFIG_JSON_PATH)
    }
}

impl RuleContext {
    pub fn new(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            base_branch: None,
            malformed_base_policy: MalformedBasePolicy::default(),
        }
    }

    pub fn with_base_branch(mut self, source: BaseBranchSource) -> Self {
        self.base_branch = Some(source);
        self
    }

    pub fn with_malformed_base_policy(mut self, policy: MalformedBasePolicy) -> Self {
        self.malformed_base_policy = policy;
        self
    }

    /// File name used in messages (`config.json`)
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Trailing remediation line pointing at the file
    pub(crate) fn fix(&self, action: &str) -> String {
        format!("  * {} your `./{}` to resolve", action, self.relative_path)
    }
}

/// Trait for implementing validation rules
///
/// Rules are pure with respect to the configuration tree. Only the UUID
/// continuity rule performs I/O, which is why evaluation is async.
#[async_trait]
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &str;

    /// Human-readable name for this rule
    fn name(&self) -> &str;

    /// Check if this rule should run for the given context
    fn is_applicable(&self, _context: &RuleContext) -> bool {
        true
    }

    /// Evaluate the rule, returning the confirmation line on success
    async fn evaluate(&self, config: &ConfigTree, context: &RuleContext) -> Result<String>;
}

/// A boxed rule for dynamic dispatch
pub type BoxedRule = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_file_name() {
        assert_eq!(RuleContext::default().file_name(), "config.json");
        assert_eq!(RuleContext::new("config.json").file_name(), "config.json");
    }

    #[test]
    fn test_context_fix_line() {
        let context = RuleContext::default();
        assert_eq!(
            context.fix("Add `x` to"),
            "  * Add `x` to your `./config/config.json` to resolve"
        );
    }
}
