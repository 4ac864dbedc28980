//! Analyser configuration loaded from YAML files
//!
//! Every field is optional in the file; missing fields take the defaults
//! documented on each field.

use crate::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Knobs that change how resources are derived from a document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Append the `_v<N>` suffix to an `x-terraform-resource-name` override
    /// when the resource segment is preceded by a version segment.
    /// Default: false
    pub append_version_on_name_override: bool,

    /// Maximum nesting of object and list-of-object properties.
    /// Default: 32
    pub max_schema_depth: usize,

    /// Sort resources by name instead of keeping the document's path order.
    /// Default: false
    pub sort_resources: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            append_version_on_name_override: false,
            max_schema_depth: 32,
            sort_resources: false,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AnalyzerError::Parse(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            AnalyzerError::Parse(format!("Failed to parse config YAML from {:?}: {}", path, e))
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserialises to unit, not to a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_for_missing_fields() {
        let config = AnalyzerConfig::from_yaml("sort_resources: true\n").unwrap();
        assert!(config.sort_resources);
        assert!(!config.append_version_on_name_override);
        assert_eq!(config.max_schema_depth, 32);

        assert_eq!(AnalyzerConfig::from_yaml("").unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "append_version_on_name_override: true").unwrap();
        writeln!(file, "max_schema_depth: 4").unwrap();

        let config = AnalyzerConfig::from_file(file.path()).unwrap();
        assert!(config.append_version_on_name_override);
        assert_eq!(config.max_schema_depth, 4);
    }

    #[test]
    fn test_from_file_reports_path() {
        let err = AnalyzerConfig::from_file(Path::new("/nonexistent/analyzer.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(AnalyzerConfig::from_yaml("max_schema_depth: deep").is_err());
    }
}
