//! `package.json` and `package-lock.json` checks

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::{read_required, RepositoryCheck};
use crate::client::{ReleaseTagSource, RepositoryRef};
use crate::config::display_value;
use crate::engine::ProgressSink;
use crate::error::{ChecklistError, Result};

/// Semantic version with optional pre-release and build metadata
pub const SEMVER_PATTERN: &str = r"^([0-9]+)\.([0-9]+)\.([0-9]+)(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+[0-9A-Za-z-]+)?$";

const NPM_INSTALL_FIX: &str = "\n\n  * Run `npm install` and push the updated package-lock.json to resolve";

fn read_manifest(root: &Path, relative: &str, hint: &str) -> Result<Value> {
    let content = read_required(root, relative, hint)?;
    serde_json::from_str(&content).map_err(|e| {
        ChecklistError::file_invalid(format!(
            "Invalid JSON in {}. Please verify your syntax is correct then push.\n\n  * {}",
            relative, e
        ))
    })
}

/// Where to look up existing release tags
#[derive(Clone)]
pub struct TagLookup {
    pub source: Arc<dyn ReleaseTagSource>,
    pub repository: RepositoryRef,
}

impl TagLookup {
    pub fn new(source: Arc<dyn ReleaseTagSource>, repository: RepositoryRef) -> Self {
        Self { source, repository }
    }
}

/// `private: true`, a semantic `version`, and a version not yet released
pub struct PackageJsonCheck {
    tags: Option<TagLookup>,
}

impl PackageJsonCheck {
    pub fn new(tags: Option<TagLookup>) -> Self {
        Self { tags }
    }

    fn check_private_flag(&self, package: &Value) -> Result<String> {
        match package.get("private") {
            None => Err(ChecklistError::file_invalid(
                "Private Flag not defined in package.json\n\n  * Add `\"private\": true` to your `./package.json` to resolve",
            )),
            Some(Value::Bool(true)) => Ok("Private Flag set to true in package.json".to_string()),
            Some(_) => Err(ChecklistError::file_invalid(
                "Private Flag not set to true in package.json\n\n  * Set `private` to `true` in your `./package.json` to resolve",
            )),
        }
    }

    fn check_version_format<'a>(&self, package: &'a Value) -> Result<&'a str> {
        let version = package.get("version").ok_or_else(|| {
            ChecklistError::file_invalid(
                "Version property not defined in package.json\n\n  * Add a `\"version\": \"1.0.0\"` property to your `./package.json` to resolve",
            )
        })?;

        let semver = Regex::new(SEMVER_PATTERN)
            .map_err(|e| ChecklistError::Internal(format!("Invalid version pattern: {}", e)))?;

        match version.as_str() {
            Some(v) if semver.is_match(v) => Ok(v),
            _ => Err(ChecklistError::file_invalid(format!(
                "Version property value is not in valid format in package.json: '{}'\n\n  * Use a semantic version such as `1.2.3` in your `./package.json` to resolve",
                display_value(version)
            ))),
        }
    }

    async fn check_version_is_new(&self, version: &str) -> Result<Option<String>> {
        let Some(lookup) = &self.tags else {
            tracing::warn!("No repository configured, release tag uniqueness not checked");
            return Ok(None);
        };

        let tags = lookup
            .source
            .list_tags(&lookup.repository.owner, &lookup.repository.name)
            .await?;

        if let Some(tag) = tags.iter().find(|tag| tag.as_str() == version) {
            return Err(ChecklistError::file_invalid(format!(
                "Version in package.json already has a release on GitHub ({})\n\n  * Increment `version` in your `./package.json` and run `npm install` to resolve",
                tag
            )));
        }

        Ok(Some(
            "Version in package.json is new and unique on GitHub".to_string(),
        ))
    }
}

#[async_trait]
impl RepositoryCheck for PackageJsonCheck {
    fn id(&self) -> &str {
        "package-json"
    }

    async fn run(&self, root: &Path, progress: &dyn ProgressSink) -> Result<()> {
        let package = read_manifest(root, "package.json", "")?;

        progress.passed(&self.check_private_flag(&package)?);

        let version = self.check_version_format(&package)?;
        progress.passed("Version property is correctly formatted in package.json");

        if let Some(confirmation) = self.check_version_is_new(version).await? {
            progress.passed(&confirmation);
        }
        Ok(())
    }
}

/// `package-lock.json` must carry the same version as `package.json`
pub struct PackageLockCheck;

impl PackageLockCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PackageLockCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryCheck for PackageLockCheck {
    fn id(&self) -> &str {
        "package-lock"
    }

    async fn run(&self, root: &Path, progress: &dyn ProgressSink) -> Result<()> {
        let lock = read_manifest(root, "package-lock.json", NPM_INSTALL_FIX)?;
        let package = read_manifest(root, "package.json", "")?;

        if lock.get("version") != package.get("version") {
            return Err(ChecklistError::file_invalid(format!(
                "Version in package.json is NOT in sync with version in package-lock.json.{}",
                NPM_INSTALL_FIX
            )));
        }

        progress.passed("package-lock.json and package.json are in sync");
        Ok(())
    }
}
