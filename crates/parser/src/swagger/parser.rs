//! Swagger document loading and the parser entry point

use super::types::SwaggerSpec;
use openapi_resource_analyzer_common::{
    AnalyzerConfig, AnalyzerError, ResourceDescriptor, Result,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Where a loaded Swagger document comes from
#[cfg_attr(test, mockall::automock)]
pub trait SpecSource {
    /// Load and deserialise the document
    fn load(&self) -> Result<SwaggerSpec>;
}

/// Document stored on disk, JSON or YAML by extension
#[derive(Debug, Clone)]
pub struct FileSpecSource {
    path: PathBuf,
}

impl FileSpecSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn is_yaml(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
    }
}

impl SpecSource for FileSpecSource {
    fn load(&self) -> Result<SwaggerSpec> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            AnalyzerError::Parse(format!(
                "Failed to read Swagger file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if self.is_yaml() {
            parse_yaml(&content)
        } else {
            parse_json(&content)
        }
    }
}

fn parse_json(json: &str) -> Result<SwaggerSpec> {
    serde_json::from_str(json)
        .map_err(|e| AnalyzerError::Parse(format!("Failed to parse Swagger JSON: {}", e)))
}

fn parse_yaml(yaml: &str) -> Result<SwaggerSpec> {
    serde_yaml::from_str(yaml)
        .map_err(|e| AnalyzerError::Parse(format!("Failed to parse Swagger YAML: {}", e)))
}

/// Swagger 2.0 resource analyser
///
/// Derives Terraform-style resource descriptors from a Swagger 2.0 document
/// that follows the collection/instance path convention and the
/// `x-terraform-*` extensions.
pub struct SwaggerParser {
    /// Loaded Swagger document
    spec: SwaggerSpec,

    config: AnalyzerConfig,
}

impl SwaggerParser {
    /// Load a Swagger document from a `.json`, `.yaml` or `.yml` file
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = SwaggerParser::from_file("cdn-service.yaml")?;
    /// let resources = parser.parse()?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_source(&FileSpecSource::new(path))
    }

    /// Parse a Swagger document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_spec(parse_json(json)?)
    }

    /// Parse a Swagger document from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_spec(parse_yaml(yaml)?)
    }

    /// Load the document from any source
    pub fn from_source(source: &dyn SpecSource) -> Result<Self> {
        Self::from_spec(source.load()?)
    }

    /// Wrap an already loaded document; only version 2.0 is accepted
    pub fn from_spec(spec: SwaggerSpec) -> Result<Self> {
        if spec.swagger != "2.0" {
            return Err(AnalyzerError::UnsupportedVersion {
                version: spec.swagger,
            });
        }

        Ok(Self {
            spec,
            config: AnalyzerConfig::default(),
        })
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Derive the resource descriptors
    pub fn parse(&self) -> Result<Vec<ResourceDescriptor>> {
        super::converter::convert_swagger_to_resources(&self.spec, &self.config)
    }

    /// Get reference to the underlying Swagger document
    pub fn spec(&self) -> &SwaggerSpec {
        &self.spec
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openapi_resource_analyzer_common::ErrorKind;
    use std::io::Write;

    const USERS_JSON: &str = r##"{
        "swagger": "2.0",
        "info": {"title": "Users", "version": "1.0.0"},
        "host": "localhost:8080",
        "paths": {
            "/users": {
                "post": {
                    "parameters": [
                        {"in": "body", "name": "user", "schema": {"$ref": "#/definitions/User"}}
                    ],
                    "responses": {"201": {"description": "created"}}
                }
            },
            "/users/{id}": {
                "get": {"responses": {"200": {"description": "ok"}}}
            }
        },
        "definitions": {
            "User": {
                "type": "object",
                "properties": {
                    "id": {"type": "string", "readOnly": true},
                    "name": {"type": "string"}
                }
            }
        }
    }"##;

    #[test]
    fn test_parse_minimal_swagger() {
        let parser = SwaggerParser::from_json(
            r#"{"swagger": "2.0", "info": {"title": "Empty", "version": "1"}}"#,
        )
        .unwrap();
        assert_eq!(parser.spec().info.title, "Empty");
        assert!(parser.parse().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_other_versions() {
        let err = SwaggerParser::from_json(
            r#"{"swagger": "3.0", "info": {"title": "Next", "version": "1"}}"#,
        )
        .err()
        .unwrap();
        assert!(matches!(err, AnalyzerError::UnsupportedVersion { .. }));
        assert_eq!(err.kind(), ErrorKind::Load);
    }

    #[test]
    fn test_from_source_uses_loaded_document() {
        let mut source = MockSpecSource::new();
        source
            .expect_load()
            .times(1)
            .returning(|| parse_json(USERS_JSON));

        let parser = SwaggerParser::from_source(&source).unwrap();
        let resources = parser.parse().unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "users");
    }

    #[test]
    fn test_from_source_propagates_load_errors() {
        let mut source = MockSpecSource::new();
        source
            .expect_load()
            .returning(|| Err(AnalyzerError::Parse("unreachable host".to_string())));

        let err = SwaggerParser::from_source(&source).err().unwrap();
        assert!(err.to_string().contains("unreachable host"));
    }

    #[test]
    fn test_from_file_json_and_yaml() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(USERS_JSON.as_bytes()).unwrap();
        let parser = SwaggerParser::from_file(json.path()).unwrap();
        assert_eq!(parser.parse().unwrap().len(), 1);

        let value: serde_json::Value = serde_json::from_str(USERS_JSON).unwrap();
        let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        yaml.write_all(serde_yaml::to_string(&value).unwrap().as_bytes())
            .unwrap();
        let parser = SwaggerParser::from_file(yaml.path()).unwrap();
        assert_eq!(parser.parse().unwrap()[0].name, "users");
    }

    #[test]
    fn test_from_file_missing() {
        let err = SwaggerParser::from_file("/nonexistent/swagger.json")
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to read Swagger file"));
    }
}
