//! Request security defaults
//!
//! Integrations ship with every TLS and proxy option blank so that the
//! platform operator, not the integration, decides them.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{Rule, RuleContext};
use crate::config::{display_value, ConfigTree};
use crate::engine::ruleset::RejectUnauthorizedPolicy;
use crate::error::{ChecklistError, Result};

/// Request properties that must be present and set to `""`
pub const EMPTY_REQUEST_PROPERTIES: [&str; 5] = ["cert", "key", "passphrase", "ca", "proxy"];

pub struct RequestDefaultsRule {
    policy: RejectUnauthorizedPolicy,
}

impl RequestDefaultsRule {
    pub fn new(policy: RejectUnauthorizedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RejectUnauthorizedPolicy {
        self.policy
    }

    fn check_empty_properties(&self, request: &Map<String, Value>, file: &str) -> Result<()> {
        let violations: Vec<String> = EMPTY_REQUEST_PROPERTIES
            .iter()
            .filter_map(|key| match request.get(*key) {
                None => Some(format!(
                    "  * '{}' property in Request Options object not defined in {}",
                    key, file
                )),
                Some(Value::String(s)) if s.is_empty() => None,
                Some(other) => Some(format!(
                    "  * '{}' property in Request Options object set to non-empty value in {}: '{}'",
                    key,
                    file,
                    display_value(other)
                )),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ChecklistError::config_invalid(format!(
                "Request Option parameter(s) in {} are invalid\n\n{}",
                file,
                violations.join("\n")
            )))
        }
    }

    fn check_reject_unauthorized(
        &self,
        request: &Map<String, Value>,
        context: &RuleContext,
    ) -> Result<()> {
        let file = context.file_name();
        let value = request.get("rejectUnauthorized");

        match (self.policy, value) {
            (RejectUnauthorizedPolicy::MustBeAbsent, None) => Ok(()),
            (RejectUnauthorizedPolicy::MustBeAbsent, Some(_)) => {
                Err(ChecklistError::config_invalid(format!(
                    "Request Option parameter `rejectUnauthorized` should not be set in {}\n\n  * Remove the `rejectUnauthorized` property from your config files to resolve",
                    file
                )))
            }
            (RejectUnauthorizedPolicy::MustBeTrue, Some(Value::Bool(true))) => Ok(()),
            (RejectUnauthorizedPolicy::MustBeTrue, None) => {
                Err(ChecklistError::config_invalid(format!(
                    "Request Option parameter `rejectUnauthorized` not defined in {}\n\n{}",
                    file,
                    context.fix("Add `\"rejectUnauthorized\": true` to the `request` object in")
                )))
            }
            (RejectUnauthorizedPolicy::MustBeTrue, Some(Value::Bool(false))) => {
                Err(ChecklistError::config_invalid(format!(
                    "Request Option parameter `rejectUnauthorized` set to false in {}\n\n{}",
                    file,
                    context.fix("Set `request.rejectUnauthorized` to `true` in")
                )))
            }
            (RejectUnauthorizedPolicy::MustBeTrue, Some(other)) => {
                Err(ChecklistError::config_invalid(format!(
                    "Request Option parameter `rejectUnauthorized` must be a boolean in {}: '{}'\n\n{}",
                    file,
                    display_value(other),
                    context.fix("Set `request.rejectUnauthorized` to `true` in")
                )))
            }
        }
    }
}

#[async_trait]
impl Rule for RequestDefaultsRule {
    fn id(&self) -> &str {
        "request-defaults"
    }

    fn name(&self) -> &str {
        "Request Options Defaults"
    }

    async fn evaluate(&self, config: &ConfigTree, context: &RuleContext) -> Result<String> {
        let file = context.file_name();

        let request = config
            .get("request")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ChecklistError::config_invalid(format!(
                    "Request Options object not defined in {}\n\n{}",
                    file,
                    context.fix(
                        "Add a `request` object with empty `cert`, `key`, `passphrase`, `ca` and `proxy` properties to"
                    )
                ))
            })?;

        self.check_empty_properties(request, file)?;
        self.check_reject_unauthorized(request, context)?;

        Ok(format!(
            "Config Request Options Defaults set correctly in {}",
            file
        ))
    }
}
