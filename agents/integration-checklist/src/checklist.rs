//! The Integration Development Checklist
//!
//! Runs every repository check in a fixed order and stops at the first
//! failure. The outcome is a [`ChecklistReport`] that the CLI renders.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::checks::{
    ConfigFileCheck, LicenseCheck, PackageJsonCheck, PackageLockCheck, RepositoryCheck,
    RequiredFileCheck, TagLookup,
};
use crate::client::{ReleaseTagSource, RemoteFileFetcher};
use crate::config::ChecklistSettings;
use crate::engine::{
    BaseBranchSource, CollectingProgress, ConfigValidator, ProgressSink, RuleContext, RuleSet,
};
use crate::error::{ErrorKind, Result};

/// Remote services available to the checklist. `None` means offline.
#[derive(Clone)]
pub struct RemoteServices {
    pub files: Arc<dyn RemoteFileFetcher>,
    pub tags: Arc<dyn ReleaseTagSource>,
}

impl RemoteServices {
    pub fn new(files: Arc<dyn RemoteFileFetcher>, tags: Arc<dyn ReleaseTagSource>) -> Self {
        Self { files, tags }
    }
}

/// The failing check of a run
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub check: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of a checklist run
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistReport {
    pub passed: bool,
    /// Confirmation lines in the order they were produced
    pub confirmations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReport>,
    pub duration_ms: u64,
}

/// Collects confirmations while forwarding them to another sink
struct TeeProgress<'a> {
    collected: CollectingProgress,
    forward: &'a dyn ProgressSink,
}

impl ProgressSink for TeeProgress<'_> {
    fn passed(&self, confirmation: &str) {
        self.collected.passed(confirmation);
        self.forward.passed(confirmation);
    }
}

pub struct Checklist {
    root: PathBuf,
    checks: Vec<Box<dyn RepositoryCheck>>,
}

impl Checklist {
    /// An empty checklist for the repository at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            checks: Vec::new(),
        }
    }

    /// The standard checklist
    ///
    /// The UUID continuity rule gets a base branch only when remote services,
    /// a repository and a base branch are all available. Tag uniqueness needs
    /// remote services and a repository.
    pub fn standard(
        root: impl Into<PathBuf>,
        settings: &ChecklistSettings,
        remote: Option<RemoteServices>,
    ) -> Result<Self> {
        let repository = settings.repository_ref()?;

        let mut context = RuleContext::new(settings.config_path.clone())
            .with_malformed_base_policy(settings.malformed_base_config);
        let mut tags = None;

        if let (Some(remote), Some(repository)) = (&remote, &repository) {
            if let Some(branch) = &settings.github.base_branch {
                context = context.with_base_branch(BaseBranchSource::new(
                    remote.files.clone(),
                    repository.clone(),
                    branch.clone(),
                ));
            }
            tags = Some(TagLookup::new(remote.tags.clone(), repository.clone()));
        }

        let validator = ConfigValidator::new(RuleSet::for_version(settings.rule_set));

        let mut checklist = Self::new(root);
        checklist.register(Box::new(ConfigFileCheck::new(validator, context)));
        checklist.register(Box::new(LicenseCheck::new(settings.license.clone())));
        checklist.register(Box::new(RequiredFileCheck::readme()));
        checklist.register(Box::new(RequiredFileCheck::prettierrc()));
        checklist.register(Box::new(RequiredFileCheck::gitignore()));
        checklist.register(Box::new(PackageJsonCheck::new(tags)));
        checklist.register(Box::new(PackageLockCheck::new()));
        Ok(checklist)
    }

    /// Append a check to the end of the list
    pub fn register(&mut self, check: Box<dyn RepositoryCheck>) {
        self.checks.push(check);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn check_ids(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.id()).collect()
    }

    /// Run every check in order, stopping at the first failure
    pub async fn run(&self, progress: &dyn ProgressSink) -> ChecklistReport {
        let start = Instant::now();
        let tee = TeeProgress {
            collected: CollectingProgress::new(),
            forward: progress,
        };

        tracing::info!(root = %self.root.display(), "Starting Integration Development Checklist");

        let mut failure = None;
        for check in &self.checks {
            tracing::debug!(check = check.id(), "Running check");
            if let Err(e) = check.run(&self.root, &tee).await {
                tracing::debug!(check = check.id(), kind = %e.kind(), "Check failed");
                failure = Some(FailureReport {
                    check: check.id().to_string(),
                    kind: e.kind(),
                    message: e.to_string(),
                });
                break;
            }
        }

        ChecklistReport {
            passed: failure.is_none(),
            confirmations: tee.collected.lines(),
            failure,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
