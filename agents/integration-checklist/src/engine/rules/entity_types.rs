//! Entity type rules
//!
//! Two independent checks over `entityTypes`: membership in the allow-list,
//! and (for newer rule sets) rejection of shorthand tokens.

use async_trait::async_trait;
use serde_json::Value;

use super::{Rule, RuleContext};
use crate::config::{display_value, ConfigTree};
use crate::engine::entity_type::{quoted_list, EntityType};
use crate::error::{ChecklistError, Result};

/// The `entityTypes` sequence; absent or null is empty
fn entity_type_values<'a>(config: &'a ConfigTree, context: &RuleContext) -> Result<&'a [Value]> {
    match config.get("entityTypes") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(values)) => Ok(values.as_slice()),
        Some(_) => Err(ChecklistError::config_invalid(format!(
            "Config `entityTypes` in {} must be a list\n\n{}",
            context.file_name(),
            context.fix("Change `entityTypes` to an array of entity type names in")
        ))),
    }
}

/// Push `item` unless an equal item is already present, keeping first-seen order
fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

/// Every entity type must be on the allow-list
pub struct EntityTypeAllowListRule {
    allowed: Vec<EntityType>,
    defer_expandable: bool,
}

impl EntityTypeAllowListRule {
    pub fn new(allowed: Vec<EntityType>) -> Self {
        Self {
            allowed,
            defer_expandable: false,
        }
    }

    /// Leave `IP`, `hash` and `*` to [`ExpandableEntityTypeRule`], which
    /// reports them together with their expansions
    pub fn with_expandable_deferred(mut self, defer: bool) -> Self {
        self.defer_expandable = defer;
        self
    }

    pub fn allowed(&self) -> &[EntityType] {
        &self.allowed
    }

    fn is_allowed(&self, value: &Value) -> bool {
        value
            .as_str()
            .and_then(|s| s.parse::<EntityType>().ok())
            .map(|t| self.allowed.contains(&t) || (self.defer_expandable && t.is_expandable()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Rule for EntityTypeAllowListRule {
    fn id(&self) -> &str {
        "entity-type-allow-list"
    }

    fn name(&self) -> &str {
        "Entity Type Validity"
    }

    async fn evaluate(&self, config: &ConfigTree, context: &RuleContext) -> Result<String> {
        let file = context.file_name();

        let mut invalid = Vec::new();
        for value in entity_type_values(config, context)? {
            if !self.is_allowed(value) {
                push_unique(&mut invalid, display_value(value));
            }
        }

        if !invalid.is_empty() {
            return Err(ChecklistError::config_invalid(format!(
                "The following `entityTypes` in {} are invalid\n  * {}\n\nIt's possible this is an issue with spelling or casing.  The possible valid `entityTypes` are: {}",
                file,
                invalid.join(", "),
                quoted_list(&self.allowed)
            )));
        }

        Ok(format!("Config `entityTypes` are valid in {}", file))
    }
}

/// `IP`, `hash` and `*` must be replaced with the concrete types they cover
pub struct ExpandableEntityTypeRule;

impl ExpandableEntityTypeRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExpandableEntityTypeRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Rule for ExpandableEntityTypeRule {
    fn id(&self) -> &str {
        "entity-type-expandable"
    }

    fn name(&self) -> &str {
        "Expandable Entity Types"
    }

    async fn evaluate(&self, config: &ConfigTree, context: &RuleContext) -> Result<String> {
        let file = context.file_name();

        let mut shorthand = Vec::new();
        for value in entity_type_values(config, context)? {
            if let Some(entity_type) = value.as_str().and_then(|s| s.parse::<EntityType>().ok()) {
                if entity_type.is_expandable() {
                    push_unique(&mut shorthand, entity_type);
                }
            }
        }

        if !shorthand.is_empty() {
            let expansions: Vec<String> = shorthand
                .iter()
                .map(|t| format!("  * \"{}\" -> {}", t, quoted_list(t.expansion())))
                .collect();

            return Err(ChecklistError::config_invalid(format!(
                "The following `entityTypes` in {} must be expanded into the specific types they cover\n{}\n\n{}",
                file,
                expansions.join("\n"),
                context.fix("Replace each shorthand type with the listed types in")
            )));
        }

        Ok(format!(
            "Config `entityTypes` contain no shorthand types in {}",
            file
        ))
    }
}
