//! Clients for the repository hosting service
//!
//! The checklist only needs two remote operations: reading a file on another
//! branch and listing release tags. Both sit behind traits so the validator
//! and the package checks can run against in-memory fakes.

pub mod github;

pub use github::{GitHubClient, GitHubClientBuilder, GitHubClientConfig};

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::error::Result;

/// Reads a file as it exists on a remote branch
#[async_trait]
pub trait RemoteFileFetcher: Send + Sync {
    /// Returns the decoded text of `relative_path` on `branch`.
    ///
    /// A missing file is `Ok(None)`; only transport, auth and decoding
    /// problems are errors.
    async fn fetch_file_at_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        relative_path: &str,
    ) -> Result<Option<String>>;
}

/// Lists the tag names of a remote repository
#[async_trait]
pub trait ReleaseTagSource: Send + Sync {
    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<String>>;
}

/// `owner/name` reference to a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepositoryRef::new(owner, name))
            }
            _ => Err(format!("Invalid repository '{}': expected owner/name", s)),
        }
    }
}
