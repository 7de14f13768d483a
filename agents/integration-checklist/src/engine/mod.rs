//! Configuration validation engine
//!
//! Runs the ordered rule pipeline against a loaded `config.json`. Rules run
//! one at a time; the first failure aborts the pipeline and is returned
//! unchanged, so later rules never contribute to the message.

pub mod entity_type;
pub mod rules;
pub mod ruleset;

pub use entity_type::EntityType;
pub use rules::{BaseBranchSource, BoxedRule, Rule, RuleContext};
pub use ruleset::{MalformedBasePolicy, RejectUnauthorizedPolicy, RuleSet, RuleSetVersion};

use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::ConfigTree;
use crate::error::Result;

/// Receives one confirmation line per passing check, as soon as it passes
pub trait ProgressSink: Send + Sync {
    fn passed(&self, confirmation: &str);
}

/// Discards confirmations
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn passed(&self, _confirmation: &str) {}
}

/// Prints `- Success: ...` lines to stdout
#[derive(Debug, Default)]
pub struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn passed(&self, confirmation: &str) {
        println!("- Success: {}", confirmation);
    }
}

/// Keeps confirmations in memory
#[derive(Debug, Default)]
pub struct CollectingProgress {
    lines: Mutex<Vec<String>>,
}

impl CollectingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl ProgressSink for CollectingProgress {
    fn passed(&self, confirmation: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(confirmation.to_string());
        }
    }
}

/// Successful outcome of a validation run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub rule_set: RuleSetVersion,
    /// Confirmation lines in evaluation order
    pub confirmations: Vec<String>,
    pub rules_evaluated: usize,
    /// Rules not applicable to the context (e.g. no base branch)
    pub rules_skipped: Vec<String>,
    pub duration_ms: u64,
}

/// The configuration validator
pub struct ConfigValidator {
    rule_set: RuleSet,
    rules: Vec<Arc<dyn Rule>>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl ConfigValidator {
    /// Create a validator with the rules of the given rule set
    pub fn new(rule_set: RuleSet) -> Self {
        let mut validator = Self::empty(rule_set);
        validator.register_default_rules();
        validator
    }

    /// Create a validator with no rules registered
    pub fn empty(rule_set: RuleSet) -> Self {
        Self {
            rule_set,
            rules: Vec::new(),
        }
    }

    /// Register the rule pipeline in evaluation order
    fn register_default_rules(&mut self) {
        self.register(Arc::new(rules::LoggingLevelRule::new()));
        self.register(Arc::new(rules::DefaultColorRule::new()));
        self.register(Arc::new(rules::RequestDefaultsRule::new(
            self.rule_set.reject_unauthorized,
        )));
        self.register(Arc::new(rules::OptionDescriptionsRule::new()));
        self.register(Arc::new(
            rules::EntityTypeAllowListRule::new(self.rule_set.allowed_entity_types())
                .with_expandable_deferred(self.rule_set.reject_expandable_types),
        ));
        if self.rule_set.reject_expandable_types {
            self.register(Arc::new(rules::ExpandableEntityTypeRule::new()));
        }
        self.register(Arc::new(rules::UuidPresenceRule::new()));
        self.register(Arc::new(rules::UuidContinuityRule::new()));
    }

    /// Append a rule to the end of the pipeline
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Register a boxed rule
    pub fn register_boxed(&mut self, rule: BoxedRule) {
        self.rules.push(Arc::from(rule));
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// Validate a configuration tree
    ///
    /// Holds no state between runs: the same inputs always give the same
    /// verdict and the same message.
    pub async fn validate(
        &self,
        config: &ConfigTree,
        context: &RuleContext,
        progress: &dyn ProgressSink,
    ) -> Result<ValidationReport> {
        let start = Instant::now();
        let mut confirmations = Vec::new();
        let mut rules_skipped = Vec::new();

        for rule in &self.rules {
            if !rule.is_applicable(context) {
                tracing::debug!(rule = rule.id(), "Rule not applicable, skipping");
                rules_skipped.push(rule.id().to_string());
                continue;
            }

            tracing::debug!(rule = rule.id(), "Evaluating rule");
            match rule.evaluate(config, context).await {
                Ok(confirmation) => {
                    tracing::info!(rule = rule.id(), "{}", confirmation);
                    progress.passed(&confirmation);
                    confirmations.push(confirmation);
                }
                Err(e) => {
                    tracing::debug!(rule = rule.id(), kind = %e.kind(), "Rule failed");
                    return Err(e);
                }
            }
        }

        Ok(ValidationReport {
            rule_set: self.rule_set.version,
            rules_evaluated: confirmations.len(),
            confirmations,
            rules_skipped,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::valid_config;
    use super::*;
    use crate::error::ChecklistError;
    use serde_json::{json, Value};

    async fn validate(config: &ConfigTree) -> Result<ValidationReport> {
        ConfigValidator::default()
            .validate(config, &RuleContext::default(), &SilentProgress)
            .await
    }

    #[test]
    fn test_rule_order_by_rule_set() {
        let ids = |v: RuleSetVersion| -> Vec<String> {
            ConfigValidator::new(RuleSet::for_version(v))
                .rules()
                .iter()
                .map(|r| r.id().to_string())
                .collect()
        };

        assert_eq!(
            ids(RuleSetVersion::V3),
            vec![
                "logging-level",
                "default-color",
                "request-defaults",
                "option-descriptions",
                "entity-type-allow-list",
                "entity-type-expandable",
                "integration-uuid-presence",
                "integration-uuid-continuity",
            ]
        );
        assert!(!ids(RuleSetVersion::V2).contains(&"entity-type-expandable".to_string()));
    }

    #[test]
    fn test_empty_validator() {
        assert!(ConfigValidator::empty(RuleSet::default()).rules().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_example_passes() {
        let progress = CollectingProgress::new();
        let report = ConfigValidator::default()
            .validate(&valid_config(), &RuleContext::default(), &progress)
            .await
            .unwrap();

        assert_eq!(report.rules_evaluated, 7);
        assert_eq!(report.rules_skipped, vec!["integration-uuid-continuity"]);
        assert_eq!(progress.lines(), report.confirmations);
        assert_eq!(
            report.confirmations[0],
            "Config Logging Level set to 'info' in config.json"
        );
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let config = json!({
            "logging": { "level": "debug" },
            "entityTypes": ["bogus"]
        });
        let progress = CollectingProgress::new();
        let err = ConfigValidator::default()
            .validate(&config, &RuleContext::default(), &progress)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Logging Level not set"));
        assert!(!err.to_string().contains("bogus"));
        assert!(progress.lines().is_empty());
    }

    #[tokio::test]
    async fn test_single_field_mutation_fails_only_that_rule() {
        let cases: [(&str, fn(&mut Value), &str, usize); 6] = [
            (
                "logging-level",
                |c| c["logging"]["level"] = json!("debug"),
                "Logging Level not set to 'info'",
                0,
            ),
            (
                "default-color",
                |c| c["defaultColor"] = json!(""),
                "Default Color not defined",
                1,
            ),
            (
                "request-defaults",
                |c| c["request"]["cert"] = json!("/etc/ssl/cert.pem"),
                "Request Option parameter(s) in config.json are invalid",
                2,
            ),
            (
                "option-descriptions",
                |c| c["options"][0]["description"] = json!(""),
                "Config Integration Option a in config.json does not have a description",
                3,
            ),
            (
                "entity-type-allow-list",
                |c| c["entityTypes"][1] = json!("URL"),
                "The following `entityTypes` in config.json are invalid",
                4,
            ),
            (
                "integration-uuid-presence",
                |c| c["polarityIntegrationUuid"] = json!(""),
                "Polarity Integration UUID not defined",
                6,
            ),
        ];
        let prefixes: Vec<&str> = cases.iter().map(|(_, _, prefix, _)| *prefix).collect();

        for (rule, mutate, prefix, passed_before) in cases {
            let mut config = valid_config();
            mutate(&mut config);

            let progress = CollectingProgress::new();
            let err = ConfigValidator::default()
                .validate(&config, &RuleContext::default(), &progress)
                .await
                .unwrap_err();
            let message = err.to_string();

            assert!(matches!(err, ChecklistError::ConfigInvalid(_)), "{}", rule);
            assert!(message.starts_with(prefix), "{}: {}", rule, message);
            for other in prefixes.iter().filter(|p| **p != prefix) {
                assert!(!message.contains(other), "{}: {}", rule, message);
            }
            assert_eq!(progress.lines().len(), passed_before, "{}", rule);
        }

        let mut config = valid_config();
        config["request"]["cert"] = json!("/etc/ssl/cert.pem");
        let message = validate(&config).await.unwrap_err().to_string();
        assert_eq!(message.matches("  * ").count(), 1);
    }

    #[tokio::test]
    async fn test_bare_ip_reported_with_expansion() {
        let mut config = valid_config();
        config["entityTypes"] = json!(["IP"]);

        let progress = CollectingProgress::new();
        let err = ConfigValidator::new(RuleSet::for_version(RuleSetVersion::V3))
            .validate(&config, &RuleContext::default(), &progress)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("must be expanded"), "{}", message);
        assert!(message.contains("  * \"IP\" -> \"IPv4\", \"IPv6\""));
        assert!(!message.contains("spelling or casing"));
        assert_eq!(
            progress.lines()[4],
            "Config `entityTypes` are valid in config.json"
        );
    }

    #[tokio::test]
    async fn test_misspelled_ip_still_fails_allow_list() {
        let mut config = valid_config();
        config["entityTypes"] = json!(["IP", "Ip"]);

        let message = validate(&config).await.unwrap_err().to_string();
        assert!(message.starts_with("The following `entityTypes` in config.json are invalid\n  * Ip\n"));
    }

    #[tokio::test]
    async fn test_expandable_rule_runs_after_allow_list() {
        let mut config = valid_config();
        config["entityTypes"] = json!(["domain", "hash"]);

        let err = validate(&config).await.unwrap_err();
        assert!(err.to_string().contains("must be expanded"));

        let legacy = ConfigValidator::new(RuleSet::for_version(RuleSetVersion::V2));
        assert!(legacy
            .validate(&config, &RuleContext::default(), &SilentProgress)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_v1_requires_reject_unauthorized_true() {
        let validator = ConfigValidator::new(RuleSet::for_version(RuleSetVersion::V1));
        let mut config = valid_config();

        let err = validator
            .validate(&config, &RuleContext::default(), &SilentProgress)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("`rejectUnauthorized` not defined"));

        config["request"]["rejectUnauthorized"] = json!(true);
        assert!(validator
            .validate(&config, &RuleContext::default(), &SilentProgress)
            .await
            .is_ok());
    }
}
