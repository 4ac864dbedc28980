//! Swagger 2.0 type definitions
//!
//! Simplified representation focusing on resource extraction. Every keyed
//! table is an `IndexMap` so iteration follows the document.

use indexmap::IndexMap;
use openapi_resource_analyzer_common::{
    AnalyzerError, HttpMethod, OperationRef, Result, ServiceEndpoint,
};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of local schema definition refs
pub const DEFINITIONS_REF_PREFIX: &str = "#/definitions/";

/// Vendor extensions and any other keys not modelled explicitly
pub type Extensions = IndexMap<String, serde_json::Value>;

/// Swagger document root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwaggerSpec {
    /// Swagger version, "2.0"
    #[serde(deserialize_with = "deserialize_scalar")]
    pub swagger: String,

    /// API metadata
    pub info: Info,

    /// Host (name or ip) serving the API, may include a port
    #[serde(default)]
    pub host: Option<String>,

    /// Base path prepended to every path
    #[serde(rename = "basePath")]
    #[serde(default)]
    pub base_path: Option<String>,

    /// Transfer protocols
    #[serde(default)]
    pub schemes: Vec<String>,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    /// Reusable schema definitions
    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,

    /// Security scheme definitions, kept opaque
    #[serde(rename = "securityDefinitions")]
    #[serde(default)]
    pub security_definitions: IndexMap<String, serde_json::Value>,

    /// Root level extensions (x-terraform-resource-regions-*, etc.)
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// API information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,

    /// API version
    pub version: String,

    /// API description
    #[serde(default)]
    pub description: Option<String>,
}

/// Path item (operations for a path)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    /// Parameters shared by all operations
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
        }
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Responses keyed by status code ("200", "default", ...)
    #[serde(default, deserialize_with = "deserialize_responses")]
    pub responses: IndexMap<String, Response>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Operation {
    /// Parameters located in the request body
    pub fn body_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.location == "body")
    }

    /// First parameter left as a `$ref` by the document loader
    pub fn unexpanded_parameter_ref(&self) -> Option<&str> {
        self.parameters.iter().find_map(|p| p.ref_path.as_deref())
    }
}

/// Parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Unexpanded `#/parameters/<name>` reference; `name` and `in` are empty then
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,

    #[serde(default)]
    pub name: String,

    /// Location: query, header, path, formData, body
    #[serde(rename = "in")]
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    /// Payload schema of a body parameter
    #[serde(default)]
    pub schema: Option<Schema>,

    /// Type of a non-body parameter
    #[serde(rename = "type")]
    #[serde(default)]
    pub param_type: Option<String>,
}

/// Response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub schema: Option<Schema>,

    /// Polling extensions live here
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// `type` keyword: a single type or a list of types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    pub fn contains(&self, type_name: &str) -> bool {
        match self {
            SchemaType::Single(t) => t == type_name,
            SchemaType::Multiple(types) => types.iter().any(|t| t == type_name),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::Single(t) => write!(f, "[{}]", t),
            SchemaType::Multiple(types) => write!(f, "[{}]", types.join(" ")),
        }
    }
}

/// Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Type: string, number, integer, boolean, array, object
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<SchemaType>,

    /// Format (e.g., int32, int64, date-time)
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Properties (for object type), in declaration order
    #[serde(default)]
    pub properties: IndexMap<String, Schema>,

    /// Required properties
    #[serde(default)]
    pub required: Vec<String>,

    /// Items schema (for array type)
    #[serde(default)]
    pub items: Option<Box<Schema>>,

    #[serde(rename = "readOnly")]
    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub default: Option<serde_json::Value>,

    #[serde(rename = "enum")]
    #[serde(default)]
    pub enum_values: Vec<serde_json::Value>,

    /// Reference
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,

    /// Extensions (x-terraform-*, etc.)
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Schema {
    /// Schema with just a type
    pub fn of_type(type_name: &str) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(type_name.to_string())),
            ..Self::default()
        }
    }

    pub fn is_type(&self, type_name: &str) -> bool {
        self.schema_type
            .as_ref()
            .is_some_and(|t| t.contains(type_name))
    }

    /// Non-empty `$ref`, if any
    pub fn reference(&self) -> Option<&str> {
        self.ref_path.as_deref().filter(|r| !r.is_empty())
    }

    /// Type tokens for diagnostics, `[]` when untyped
    pub fn type_tokens(&self) -> String {
        self.schema_type
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "[]".to_string())
    }
}

/// Map key or value that may be written as a bare YAML number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScalarString(String);

impl<'de> Deserialize<'de> for ScalarString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> Visitor<'de> for ScalarVisitor {
            type Value = ScalarString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a string or a number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(ScalarString(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                // 2.0 must stay "2.0", not "2"
                Ok(ScalarString(format!("{:?}", v)))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

fn deserialize_scalar<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    ScalarString::deserialize(deserializer).map(|s| s.0)
}

// YAML status codes are integer keys; buffering through `flatten` keeps them
// as numbers, so they are accepted explicitly here.
fn deserialize_responses<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, Response>, D::Error> {
    let raw: IndexMap<ScalarString, Response> = IndexMap::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(code, response)| (code.0, response)).collect())
}

/// Resolve a `#/definitions/<name>` ref against a definitions table
pub fn resolve_definition_ref<'a>(
    definitions: &'a IndexMap<String, Schema>,
    reference: &str,
) -> Result<&'a Schema> {
    let name = reference
        .strip_prefix(DEFINITIONS_REF_PREFIX)
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .ok_or_else(|| AnalyzerError::UnexpandedRef {
            reference: reference.to_string(),
        })?;

    definitions
        .get(name)
        .ok_or_else(|| AnalyzerError::MissingDefinition {
            reference: reference.to_string(),
        })
}

impl SwaggerSpec {
    /// Resolve a schema definition ref
    pub fn resolve_schema_ref(&self, reference: &str) -> Result<&Schema> {
        resolve_definition_ref(&self.definitions, reference)
    }

    /// Look up the operation a resource handle points at
    pub fn operation(&self, operation: &OperationRef) -> Option<&Operation> {
        self.paths
            .get(&operation.path)
            .and_then(|item| item.operation(operation.method))
    }

    /// Endpoint information for URL building
    pub fn endpoint(&self) -> ServiceEndpoint {
        ServiceEndpoint {
            host: self.host.clone(),
            base_path: self.base_path.clone(),
            schemes: self.schemes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_definition_ref() {
        let mut definitions = IndexMap::new();
        definitions.insert("User".to_string(), Schema::of_type("object"));

        assert!(resolve_definition_ref(&definitions, "#/definitions/User").is_ok());
        assert!(matches!(
            resolve_definition_ref(&definitions, "#/definitions/Missing"),
            Err(AnalyzerError::MissingDefinition { .. })
        ));
        assert!(matches!(
            resolve_definition_ref(&definitions, "users.yaml#/User"),
            Err(AnalyzerError::UnexpandedRef { .. })
        ));
    }

    #[test]
    fn test_parameter_ref_is_kept() {
        let operation: Operation = serde_json::from_str(
            r##"{"parameters": [{"$ref": "#/parameters/Q"}, {"in": "query", "name": "q"}]}"##,
        )
        .unwrap();

        assert_eq!(operation.unexpanded_parameter_ref(), Some("#/parameters/Q"));
        assert_eq!(operation.parameters[0].name, "");
        assert_eq!(operation.body_parameters().count(), 0);
    }

    #[test]
    fn test_schema_type_single_or_list() {
        let schema: Schema = serde_json::from_str(r#"{"type": "string"}"#).unwrap();
        assert!(schema.is_type("string"));
        assert_eq!(schema.type_tokens(), "[string]");

        let schema: Schema = serde_json::from_str(r#"{"type": ["integer", "null"]}"#).unwrap();
        assert!(schema.is_type("integer"));
        assert_eq!(schema.type_tokens(), "[integer null]");

        assert_eq!(Schema::default().type_tokens(), "[]");
    }

    #[test]
    fn test_yaml_numeric_status_codes_and_version() {
        let yaml = r#"
swagger: 2.0
info:
  title: Test
  version: "1.0"
paths:
  /users:
    post:
      x-terraform-resource-timeout: 30s
      responses:
        201:
          description: created
        default:
          description: error
"#;
        let spec: SwaggerSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.swagger, "2.0");
        let post = spec.paths["/users"].post.as_ref().unwrap();
        let codes: Vec<&str> = post.responses.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["201", "default"]);
    }

    #[test]
    fn test_extensions_keep_declaration_order() {
        let schema: Schema = serde_json::from_str(
            r#"{"type": "string", "x-terraform-sensitive": true, "x-terraform-force-new": false}"#,
        )
        .unwrap();
        let keys: Vec<&str> = schema.extensions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["x-terraform-sensitive", "x-terraform-force-new"]);
    }
}
