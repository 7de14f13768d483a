//! Integration identity rules
//!
//! `polarityIntegrationUuid` identifies an integration for its whole
//! lifetime. It must be present, and once merged it must never change.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Rule, RuleContext};
use crate::config::ConfigTree;
use crate::engine::ruleset::MalformedBasePolicy;
use crate::error::{ChecklistError, Result};

pub const UUID_KEY: &str = "polarityIntegrationUuid";

fn integration_uuid(config: &Value) -> Option<&str> {
    config
        .get(UUID_KEY)
        .and_then(Value::as_str)
        .filter(|uuid| !uuid.is_empty())
}

/// A fresh time-based UUID to suggest when none is set
pub fn suggested_uuid() -> Uuid {
    let random = Uuid::new_v4();
    let mut node_id = [0u8; 6];
    node_id.copy_from_slice(&random.as_bytes()[..6]);
    Uuid::now_v1(&node_id)
}

/// `polarityIntegrationUuid` must be a non-empty string
pub struct UuidPresenceRule;

impl UuidPresenceRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UuidPresenceRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for UuidPresenceRule {
    fn id(&self) -> &str {
        "integration-uuid-presence"
    }

    fn name(&self) -> &str {
        "Integration UUID Presence"
    }

    async fn evaluate(&self, config: &ConfigTree, context: &RuleContext) -> Result<String> {
        let file = context.file_name();

        if integration_uuid(config).is_none() {
            return Err(ChecklistError::config_invalid(format!(
                "Polarity Integration UUID not defined in {}\n\n{}",
                file,
                context.fix(&format!(
                    "Add `\"{}\": \"{}\",` to",
                    UUID_KEY,
                    suggested_uuid()
                ))
            )));
        }

        Ok(format!("Config `{}` is set in {}", UUID_KEY, file))
    }
}

/// The UUID must match the one on the branch being merged into
pub struct UuidContinuityRule;

impl UuidContinuityRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UuidContinuityRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for UuidContinuityRule {
    fn id(&self) -> &str {
        "integration-uuid-continuity"
    }

    fn name(&self) -> &str {
        "Integration UUID Continuity"
    }

    fn is_applicable(&self, context: &RuleContext) -> bool {
        context.base_branch.is_some()
    }

    async fn evaluate(&self, config: &ConfigTree, context: &RuleContext) -> Result<String> {
        let file = context.file_name();
        let Some(base) = &context.base_branch else {
            return Ok(format!(
                "Config `{}` continuity not checked: no base branch",
                UUID_KEY
            ));
        };

        let previous_content = base
            .fetcher
            .fetch_file_at_branch(
                &base.repository.owner,
                &base.repository.name,
                &base.branch,
                &context.relative_path,
            )
            .await?;

        let previous_content = match previous_content {
            Some(content) if !content.trim().is_empty() => content,
            _ => {
                tracing::info!(
                    branch = %base.branch,
                    path = %context.relative_path,
                    "Base branch has no configuration file, UUID continuity not checked"
                );
                return Ok(format!(
                    "Config `{}` is new: branch '{}' has no {}",
                    UUID_KEY, base.branch, file
                ));
            }
        };

        let previous: Value = match serde_json::from_str(&previous_content) {
            Ok(value) => value,
            Err(e) => match context.malformed_base_policy {
                MalformedBasePolicy::Skip => {
                    tracing::info!(
                        branch = %base.branch,
                        error = %e,
                        "NOTE: Unable to parse the base branch's `{}`, the check for the {} not changing is not being run",
                        context.relative_path,
                        UUID_KEY
                    );
                    return Ok(format!(
                        "Config `{}` continuity check skipped (unable to parse {} on branch '{}')",
                        UUID_KEY, file, base.branch
                    ));
                }
                MalformedBasePolicy::Fail => {
                    return Err(ChecklistError::upstream(format!(
                        "Unable to parse `{}` on branch '{}': {}",
                        context.relative_path, base.branch, e
                    )));
                }
            },
        };

        if let Some(previous_uuid) = integration_uuid(&previous) {
            if integration_uuid(config) != Some(previous_uuid) {
                return Err(ChecklistError::config_invalid(format!(
                    "Polarity Integration UUID in {} does not match the UUID in the base branch {}\n\n{}",
                    file,
                    file,
                    context.fix(&format!("Update to `\"{}\": \"{}\",` in", UUID_KEY, previous_uuid))
                )));
            }
        }

        Ok(format!(
            "Config `{}` has not been changed from branch '{}' in {}",
            UUID_KEY, base.branch, file
        ))
    }
}
