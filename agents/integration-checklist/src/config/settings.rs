//! Checklist settings
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. An optional TOML file (`.integration-checklist.toml` at the repository
//!    root, or the file passed with `--settings`)
//! 2. CI environment variables
//! 3. Command-line flags (applied by the CLI)
//!
//! The resolved settings are passed explicitly into the validator and the
//! checklist; nothing below the CLI reads the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::CONFIG_JSON_PATH;
use crate::client::RepositoryRef;
use crate::engine::ruleset::{MalformedBasePolicy, RuleSetVersion};
use crate::error::{ChecklistError, Result};

/// Name of the settings file looked up at the repository root
pub const SETTINGS_FILE_NAME: &str = ".integration-checklist.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChecklistSettings {
    pub rule_set: RuleSetVersion,
    pub malformed_base_config: MalformedBasePolicy,
    /// Configuration file, relative to the repository root
    pub config_path: String,
    pub github: GitHubSettings,
    pub license: LicenseSettings,
}

impl Default for ChecklistSettings {
    fn default() -> Self {
        Self {
            rule_set: RuleSetVersion::default(),
            malformed_base_config: MalformedBasePolicy::default(),
            config_path: CONFIG_JSON_PATH.to_string(),
            github: GitHubSettings::default(),
            license: LicenseSettings::default(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSettings {
    pub api_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// `owner/name`
    pub repository: Option<String>,
    /// Branch a pull request will be merged into
    pub base_branch: Option<String>,
    pub timeout_ms: u64,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            repository: None,
            base_branch: None,
            timeout_ms: 10_000,
        }
    }
}

impl std::fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("repository", &self.repository)
            .field("base_branch", &self.base_branch)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Expected copyright line of the LICENSE file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LicenseSettings {
    pub holder: String,
    pub year: u16,
}

impl Default for LicenseSettings {
    fn default() -> Self {
        Self {
            holder: "Polarity.io, Inc.".to_string(),
            year: 2020,
        }
    }
}

impl ChecklistSettings {
    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChecklistError::invalid_input(format!(
                "Failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Load the file layer: the explicit file if given, otherwise the
    /// default file at `root` if it exists, otherwise defaults
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "Loading settings file");
            return Self::from_file(path);
        }

        let default_path = root.join(SETTINGS_FILE_NAME);
        if default_path.is_file() {
            tracing::debug!(path = %default_path.display(), "Loading settings file");
            Self::from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay process environment variables
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables from an arbitrary lookup. Empty values are ignored,
    /// matching how CI runners leave unset context as `""`.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(rule_set) = get("CHECKLIST_RULE_SET") {
            self.rule_set = rule_set.parse().map_err(ChecklistError::InvalidInput)?;
        }
        if let Some(policy) = get("CHECKLIST_MALFORMED_BASE_CONFIG") {
            self.malformed_base_config = policy.parse().map_err(ChecklistError::InvalidInput)?;
        }
        if let Some(url) = get("GITHUB_API_URL") {
            self.github.api_url = url;
        }
        if let Some(token) = get("GITHUB_TOKEN").or_else(|| get("INPUT_GITHUB_TOKEN")) {
            self.github.token = Some(token);
        }
        if let Some(repository) = get("GITHUB_REPOSITORY") {
            self.github.repository = Some(repository);
        }
        if let Some(branch) = get("GITHUB_BASE_REF") {
            self.github.base_branch = Some(branch);
        }

        Ok(self)
    }

    /// The hosted repository, if one is configured
    pub fn repository_ref(&self) -> Result<Option<RepositoryRef>> {
        self.github
            .repository
            .as_deref()
            .map(|r| r.parse().map_err(ChecklistError::InvalidInput))
            .transpose()
    }
}
