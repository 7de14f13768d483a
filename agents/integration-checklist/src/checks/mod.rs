//! Repository checks
//!
//! Each check inspects one part of the integration repository and reports
//! one or more confirmation lines through a [`ProgressSink`], or fails with
//! the error the author has to fix.

pub mod config_file;
pub mod files;
pub mod package;

pub use config_file::ConfigFileCheck;
pub use files::{LicenseCheck, RequiredFileCheck};
pub use package::{PackageJsonCheck, PackageLockCheck, TagLookup};

use async_trait::async_trait;
use std::path::Path;

use crate::engine::ProgressSink;
use crate::error::{ChecklistError, Result};

#[async_trait]
pub trait RepositoryCheck: Send + Sync {
    /// Unique identifier for this check
    fn id(&self) -> &str;

    /// Run against the repository rooted at `root`
    async fn run(&self, root: &Path, progress: &dyn ProgressSink) -> Result<()>;
}

/// Read a UTF-8 file, mapping "not found" to [`ChecklistError::FileMissing`]
pub(crate) fn read_required(root: &Path, relative: &str, hint: &str) -> Result<String> {
    let path = root.join(relative);
    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ChecklistError::file_missing(format!("File Not Found: {}{}", relative, hint)))
        }
        Err(e) => Err(ChecklistError::Internal(format!(
            "Failed to read '{}': {}",
            path.display(),
            e
        ))),
    }
}
