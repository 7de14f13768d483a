//! Versioned rule table
//!
//! The checklist has shipped with diverging rules over time. Rather than
//! keeping forked validators, each historical behavior is a row in this
//! table and the active row is chosen explicitly.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::entity_type::EntityType;

/// Identifier of a rule table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RuleSetVersion {
    /// `rejectUnauthorized` must be `true`; bare `IP` allowed
    V1,
    /// `rejectUnauthorized` must be absent; bare `IP` allowed
    V2,
    /// `rejectUnauthorized` must be absent; shorthand entity types rejected
    #[default]
    V3,
}

impl fmt::Display for RuleSetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSetVersion::V1 => write!(f, "v1"),
            RuleSetVersion::V2 => write!(f, "v2"),
            RuleSetVersion::V3 => write!(f, "v3"),
        }
    }
}

impl FromStr for RuleSetVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" => Ok(RuleSetVersion::V1),
            "v2" | "2" => Ok(RuleSetVersion::V2),
            "v3" | "3" => Ok(RuleSetVersion::V3),
            _ => Err(format!("Unknown rule set: {} (expected v1, v2 or v3)", s)),
        }
    }
}

/// What `request.rejectUnauthorized` must look like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RejectUnauthorizedPolicy {
    MustBeAbsent,
    MustBeTrue,
}

impl fmt::Display for RejectUnauthorizedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectUnauthorizedPolicy::MustBeAbsent => write!(f, "must-be-absent"),
            RejectUnauthorizedPolicy::MustBeTrue => write!(f, "must-be-true"),
        }
    }
}

/// How to treat a base-branch `config.json` that cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MalformedBasePolicy {
    /// Log a note and treat UUID continuity as unverifiable
    #[default]
    Skip,
    /// Abort the run with an upstream fetch failure
    Fail,
}

impl FromStr for MalformedBasePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(MalformedBasePolicy::Skip),
            "fail" => Ok(MalformedBasePolicy::Fail),
            _ => Err(format!("Unknown malformed base config policy: {} (expected skip or fail)", s)),
        }
    }
}

/// One row of the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    pub version: RuleSetVersion,
    pub reject_unauthorized: RejectUnauthorizedPolicy,
    /// Whether bare `IP` is on the entity type allow-list
    pub allow_bare_ip: bool,
    /// Whether `IP`, `hash` and `*` are rejected in favour of concrete types
    pub reject_expandable_types: bool,
}

impl RuleSet {
    pub const fn for_version(version: RuleSetVersion) -> Self {
        match version {
            RuleSetVersion::V1 => Self {
                version,
                reject_unauthorized: RejectUnauthorizedPolicy::MustBeTrue,
                allow_bare_ip: true,
                reject_expandable_types: false,
            },
            RuleSetVersion::V2 => Self {
                version,
                reject_unauthorized: RejectUnauthorizedPolicy::MustBeAbsent,
                allow_bare_ip: true,
                reject_expandable_types: false,
            },
            RuleSetVersion::V3 => Self {
                version,
                reject_unauthorized: RejectUnauthorizedPolicy::MustBeAbsent,
                allow_bare_ip: false,
                reject_expandable_types: true,
            },
        }
    }

    /// Every row of the table, oldest first
    pub fn all() -> [RuleSet; 3] {
        [
            Self::for_version(RuleSetVersion::V1),
            Self::for_version(RuleSetVersion::V2),
            Self::for_version(RuleSetVersion::V3),
        ]
    }

    /// The entity types accepted by the allow-list rule
    pub fn allowed_entity_types(&self) -> Vec<EntityType> {
        EntityType::ALL
            .iter()
            .copied()
            .filter(|t| self.allow_bare_ip || *t != EntityType::Ip)
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::for_version(RuleSetVersion::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!("v1".parse::<RuleSetVersion>().unwrap(), RuleSetVersion::V1);
        assert_eq!("V3".parse::<RuleSetVersion>().unwrap(), RuleSetVersion::V3);
        assert_eq!("2".parse::<RuleSetVersion>().unwrap(), RuleSetVersion::V2);
        assert!("v9".parse::<RuleSetVersion>().is_err());
    }

    #[test]
    fn test_default_is_latest() {
        let rules = RuleSet::default();
        assert_eq!(rules.version, RuleSetVersion::V3);
        assert_eq!(rules.reject_unauthorized, RejectUnauthorizedPolicy::MustBeAbsent);
        assert!(rules.reject_expandable_types);
    }

    #[test]
    fn test_allow_list_by_version() {
        let legacy = RuleSet::for_version(RuleSetVersion::V1).allowed_entity_types();
        assert_eq!(legacy.len(), 15);
        assert_eq!(legacy[0], EntityType::Ip);

        let current = RuleSet::for_version(RuleSetVersion::V3).allowed_entity_types();
        assert_eq!(current.len(), 14);
        assert!(!current.contains(&EntityType::Ip));
        assert!(current.contains(&EntityType::Hash));
        assert!(current.contains(&EntityType::Any));
    }

    #[test]
    fn test_malformed_policy_parsing() {
        assert_eq!("skip".parse::<MalformedBasePolicy>().unwrap(), MalformedBasePolicy::Skip);
        assert_eq!("FAIL".parse::<MalformedBasePolicy>().unwrap(), MalformedBasePolicy::Fail);
        assert!("ignore".parse::<MalformedBasePolicy>().is_err());
        assert_eq!(MalformedBasePolicy::default(), MalformedBasePolicy::Skip);
    }
}
