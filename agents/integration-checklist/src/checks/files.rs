//! LICENSE, README.md, .prettierrc and .gitignore checks

use async_trait::async_trait;
use std::path::Path;

use super::{read_required, RepositoryCheck};
use crate::config::LicenseSettings;
use crate::engine::ProgressSink;
use crate::error::{ChecklistError, Result};

const MIT_BODY: &str = "Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.";

/// Accepted first lines of the license text
const MIT_HEADINGS: [&str; 2] = ["The MIT License", "MIT License"];

/// A file that only has to exist
pub struct RequiredFileCheck {
    id: String,
    relative_path: String,
}

impl RequiredFileCheck {
    pub fn new(relative_path: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        Self {
            id: format!("file:{}", relative_path),
            relative_path,
        }
    }

    pub fn readme() -> Self {
        Self::new("README.md")
    }

    pub fn prettierrc() -> Self {
        Self::new(".prettierrc")
    }

    pub fn gitignore() -> Self {
        Self::new(".gitignore")
    }
}

#[async_trait]
impl RepositoryCheck for RequiredFileCheck {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(&self, root: &Path, progress: &dyn ProgressSink) -> Result<()> {
        let is_file = std::fs::metadata(root.join(&self.relative_path))
            .map(|m| m.is_file())
            .unwrap_or(false);

        if !is_file {
            return Err(ChecklistError::file_missing(format!(
                "File Not Found: {}\n\n  * Add `./{}` to your integration to resolve",
                self.relative_path, self.relative_path
            )));
        }

        progress.passed(&format!("{} file present", self.relative_path));
        Ok(())
    }
}

/// LICENSE must be the MIT license with the expected copyright line
pub struct LicenseCheck {
    settings: LicenseSettings,
}

impl LicenseCheck {
    pub fn new(settings: LicenseSettings) -> Self {
        Self { settings }
    }

    /// The license text under each accepted heading
    pub fn expected_texts(&self) -> Vec<String> {
        MIT_HEADINGS
            .iter()
            .map(|heading| {
                format!(
                    "{}\n\nCopyright (c) {} {}\n\n{}",
                    heading, self.settings.year, self.settings.holder, MIT_BODY
                )
            })
            .collect()
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[async_trait]
impl RepositoryCheck for LicenseCheck {
    fn id(&self) -> &str {
        "license"
    }

    async fn run(&self, root: &Path, progress: &dyn ProgressSink) -> Result<()> {
        let content = read_required(root, "LICENSE", "")?;
        let actual = strip_whitespace(&content);
        let expected = self.expected_texts();

        if !expected.iter().any(|text| strip_whitespace(text) == actual) {
            return Err(ChecklistError::file_invalid(format!(
                "LICENSE File Value Incorrect\n\n  * Replace `./LICENSE` with the following to resolve:\n\n{}",
                expected[0]
            )));
        }

        progress.passed("LICENSE file contents correct");
        Ok(())
    }
}
