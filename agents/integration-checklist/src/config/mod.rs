//! Configuration loading
//!
//! Reads an integration's `config/config.json` into a generic JSON tree and
//! provides the small set of lookups the validator needs. Only strict JSON is
//! accepted; the script form of the configuration is never evaluated.

pub mod settings;

pub use settings::{ChecklistSettings, GitHubSettings, LicenseSettings};

use serde_json::Value;
use std::path::Path;

use crate::error::{ChecklistError, Result};

/// Default location of the configuration file, relative to the repository root
pub const CONFIG_JSON_PATH: &str = "config/config.json";

/// Parsed configuration file. Key order follows the file.
pub type ConfigTree = Value;

/// Load and parse a configuration file from disk
///
/// Returns [`ChecklistError::ConfigMissing`] when the file does not exist and
/// [`ChecklistError::ConfigInvalid`] when it is not valid JSON.
pub fn load_config(path: &Path) -> Result<ConfigTree> {
    let file_name = display_name(path);
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ChecklistError::config_missing(format!(
                "File Not Found: {}\n\n  * Add `./{}` file to your integration to resolve",
                file_name,
                path_hint(path)
            )));
        }
        Err(e) => {
            return Err(ChecklistError::Internal(format!(
                "Failed to read '{}': {}",
                path.display(),
                e
            )))
        }
    };

    tracing::debug!(path = %path.display(), bytes = content.len(), "Loaded configuration file");
    parse_config(&content, &file_name)
}

/// Parse configuration text
pub fn parse_config(content: &str, file_name: &str) -> Result<ConfigTree> {
    serde_json::from_str(content).map_err(|e| {
        ChecklistError::config_invalid(format!(
            "Invalid JSON in {}. Please verify your syntax is correct then push.\n\n  * {}",
            file_name, e
        ))
    })
}

/// Look up a dotted path (`logging.level`) in the tree
pub fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(tree, |node, key| node.as_object().and_then(|map| map.get(key)))
}

/// JavaScript-style truthiness, used for option descriptions
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a value for an error message: strings bare, everything else as JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(CONFIG_JSON_PATH)
        .to_string()
}

fn path_hint(path: &Path) -> String {
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());
    match parent {
        Some(dir) => format!("{}/{}", dir, display_name(path)),
        None => display_name(path),
    }
}
