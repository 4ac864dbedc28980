//! Classifies paths into resource root/instance pairs
//!
//! A path is a resource candidate when it is an instance path (`/users/{id}`)
//! exposing GET, its collection path (`/users` or `/users/`) exposes a POST
//! with exactly one body parameter, and the body's payload definition has an
//! identifier property.

use crate::swagger::{resolve_definition_ref, PathItem, PropertyExtensions, Schema};
use indexmap::IndexMap;
use openapi_resource_analyzer_common::{AnalyzerError, Result};

/// A path that passed every compliance check
#[derive(Debug, Clone, Copy)]
pub struct CompliantEndpoint<'a> {
    pub root_path: &'a str,
    pub root_item: &'a PathItem,
    pub instance_item: &'a PathItem,
    /// Resolved POST body definition
    pub payload: &'a Schema,
}

/// Runs the compliance checks against one document's path table
pub struct PathClassifier<'a> {
    paths: &'a IndexMap<String, PathItem>,
    definitions: &'a IndexMap<String, Schema>,
}

/// Whether the path ends in a single `{param}` segment after a literal one
///
/// A single trailing `/` is tolerated.
pub fn is_resource_instance_endpoint(path: &str) -> bool {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let Some(rest) = trimmed.strip_prefix('/') else {
        return false;
    };

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return false;
    }

    let Some((last, ancestors)) = segments.split_last() else {
        return false;
    };
    is_param_segment(last) && ancestors.iter().any(|s| !is_param_segment(s))
}

pub(crate) fn is_param_segment(segment: &str) -> bool {
    segment.len() > 2
        && segment.starts_with('{')
        && segment.ends_with('}')
        && !segment[1..segment.len() - 1].contains(['{', '}'])
}

impl<'a> PathClassifier<'a> {
    pub fn new(
        paths: &'a IndexMap<String, PathItem>,
        definitions: &'a IndexMap<String, Schema>,
    ) -> Self {
        Self { paths, definitions }
    }

    /// Run every check in order; the first failure wins
    pub fn is_end_point_fully_terraform_resource_compliant(
        &self,
        instance_path: &str,
    ) -> Result<CompliantEndpoint<'a>> {
        let instance_item = self.validate_instance_path(instance_path)?;
        let root_path = self.find_matching_resource_root_path(instance_path)?;
        let (root_item, payload) = self.validate_root_path(root_path)?;
        validate_resource_schema_definition(payload)?;

        Ok(CompliantEndpoint {
            root_path,
            root_item,
            instance_item,
            payload,
        })
    }

    /// Instance shape plus a GET operation
    pub fn validate_instance_path(&self, path: &str) -> Result<&'a PathItem> {
        if !is_resource_instance_endpoint(path) {
            return Err(AnalyzerError::NotInstancePath {
                path: path.to_string(),
            });
        }

        self.paths
            .get(path)
            .filter(|item| item.get.is_some())
            .ok_or_else(|| AnalyzerError::MissingInstanceGet {
                path: path.to_string(),
            })
    }

    /// Collection path for an instance path, with or without trailing slash
    ///
    /// `/users/{id}` probes `/users/` first and then `/users`.
    pub fn find_matching_resource_root_path(&self, instance_path: &str) -> Result<&'a str> {
        let trimmed = instance_path.strip_suffix('/').unwrap_or(instance_path);
        let missing = || AnalyzerError::MissingRootPath {
            path: instance_path.to_string(),
        };

        let slash = trimmed.rfind('/').ok_or_else(missing)?;
        let with_slash = &trimmed[..=slash];
        let without_slash = &trimmed[..slash];

        [with_slash, without_slash]
            .into_iter()
            .find_map(|candidate| self.paths.get_key_value(candidate))
            .map(|(path, _)| path.as_str())
            .ok_or_else(missing)
    }

    /// POST with exactly one body parameter pointing at a non-empty definition
    pub fn validate_root_path(&self, root_path: &str) -> Result<(&'a PathItem, &'a Schema)> {
        let root_item = self
            .paths
            .get(root_path)
            .ok_or_else(|| AnalyzerError::MissingRootPath {
                path: root_path.to_string(),
            })?;

        let post = root_item
            .post
            .as_ref()
            .ok_or_else(|| AnalyzerError::MissingRootPost {
                path: root_path.to_string(),
            })?;

        if let Some(reference) = post.unexpanded_parameter_ref() {
            return Err(AnalyzerError::UnexpandedRef {
                reference: reference.to_string(),
            });
        }

        let bodies: Vec<_> = post.body_parameters().collect();
        let body = match bodies.as_slice() {
            [] => {
                return Err(AnalyzerError::MissingBodyParameter {
                    path: root_path.to_string(),
                })
            }
            [body] => *body,
            _ => {
                return Err(AnalyzerError::MultipleBodyParameters {
                    path: root_path.to_string(),
                    count: bodies.len(),
                })
            }
        };

        let reference = body
            .schema
            .as_ref()
            .and_then(Schema::reference)
            .ok_or_else(|| AnalyzerError::MissingBodySchemaRef {
                path: root_path.to_string(),
            })?;

        let payload = resolve_definition_ref(self.definitions, reference)?;
        if payload.properties.is_empty() {
            return Err(AnalyzerError::EmptyPayloadSchema {
                reference: reference.to_string(),
            });
        }

        Ok((root_item, payload))
    }
}

/// The payload must carry exactly one property flagged `x-terraform-id`, or
/// failing that an `id` property
pub fn validate_resource_schema_definition(payload: &Schema) -> Result<()> {
    let mut flagged = Vec::new();
    for (name, property) in &payload.properties {
        if PropertyExtensions::parse(&property.extensions)?.id {
            flagged.push(name.as_str());
        }
    }

    match flagged.as_slice() {
        [_] => Ok(()),
        [] if payload.properties.contains_key("id") => Ok(()),
        [] => Err(AnalyzerError::MissingIdentifier),
        _ => Err(AnalyzerError::MultipleIdentifiers {
            properties: flagged.join(", "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swagger::SwaggerSpec;

    fn spec(paths: serde_json::Value, definitions: serde_json::Value) -> SwaggerSpec {
        serde_json::from_value(serde_json::json!({
            "swagger": "2.0",
            "info": {"title": "test", "version": "1.0"},
            "paths": paths,
            "definitions": definitions
        }))
        .unwrap()
    }

    fn users_paths(root: &str) -> serde_json::Value {
        serde_json::json!({
            (root): {
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
        })
    }

    fn user_definition() -> serde_json::Value {
        serde_json::json!({
            "User": {"type": "object", "properties": {"id": {"type": "string", "readOnly": true}}}
        })
    }

    #[test]
    fn test_is_resource_instance_endpoint() {
        for path in [
            "/users/{id}",
            "/users/{id}/",
            "/v1/cdns/{id}",
            "/a/b/{name}/c/{id}",
            "/api/v1/nodes/{name}/proxy/{path}",
        ] {
            assert!(is_resource_instance_endpoint(path), "{}", path);
        }

        for path in [
            "/a/b/c/d",
            "/users",
            "/users/",
            "/{id}",
            "/users/{id}//",
            "/users/{id}/status",
            "users/{id}",
            "",
        ] {
            assert!(!is_resource_instance_endpoint(path), "{}", path);
        }
    }

    #[test]
    fn test_find_matching_resource_root_path() {
        let with_slash = spec(users_paths("/users/"), user_definition());
        let classifier = PathClassifier::new(&with_slash.paths, &with_slash.definitions);
        assert_eq!(
            classifier.find_matching_resource_root_path("/users/{id}").unwrap(),
            "/users/"
        );

        let without_slash = spec(users_paths("/users"), user_definition());
        let classifier = PathClassifier::new(&without_slash.paths, &without_slash.definitions);
        assert_eq!(
            classifier.find_matching_resource_root_path("/users/{id}").unwrap(),
            "/users"
        );

        let neither = spec(users_paths("/accounts"), user_definition());
        let classifier = PathClassifier::new(&neither.paths, &neither.definitions);
        assert!(matches!(
            classifier.find_matching_resource_root_path("/users/{id}"),
            Err(AnalyzerError::MissingRootPath { .. })
        ));
    }

    #[test]
    fn test_compliant_endpoint() {
        let spec = spec(users_paths("/users"), user_definition());
        let classifier = PathClassifier::new(&spec.paths, &spec.definitions);

        let endpoint = classifier
            .is_end_point_fully_terraform_resource_compliant("/users/{id}")
            .unwrap();
        assert_eq!(endpoint.root_path, "/users");
        assert!(endpoint.payload.properties.contains_key("id"));
        assert!(endpoint.instance_item.get.is_some());
    }

    #[test]
    fn test_instance_without_get() {
        let spec = spec(
            serde_json::json!({"/users/{id}": {"delete": {"responses": {}}}}),
            user_definition(),
        );
        let classifier = PathClassifier::new(&spec.paths, &spec.definitions);
        assert!(matches!(
            classifier.validate_instance_path("/users/{id}"),
            Err(AnalyzerError::MissingInstanceGet { .. })
        ));
        assert!(matches!(
            classifier.validate_instance_path("/users"),
            Err(AnalyzerError::NotInstancePath { .. })
        ));
    }

    #[test]
    fn test_body_parameter_rules() {
        let body = |name: &str| {
            serde_json::json!({"in": "body", "name": name, "schema": {"$ref": "#/definitions/User"}})
        };
        let root_with = |parameters: serde_json::Value| {
            spec(
                serde_json::json!({"/users": {"post": {"parameters": parameters, "responses": {}}}}),
                user_definition(),
            )
        };

        let none = root_with(serde_json::json!([{"in": "query", "name": "dry_run", "type": "boolean"}]));
        let classifier = PathClassifier::new(&none.paths, &none.definitions);
        let err = classifier.validate_root_path("/users").unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingBodyParameter { .. }));

        let two = root_with(serde_json::json!([body("a"), body("b")]));
        let classifier = PathClassifier::new(&two.paths, &two.definitions);
        let err = classifier.validate_root_path("/users").unwrap_err();
        assert!(matches!(err, AnalyzerError::MultipleBodyParameters { count: 2, .. }));

        let no_ref = root_with(serde_json::json!([{"in": "body", "name": "user", "schema": {"type": "object"}}]));
        let classifier = PathClassifier::new(&no_ref.paths, &no_ref.definitions);
        assert!(matches!(
            classifier.validate_root_path("/users"),
            Err(AnalyzerError::MissingBodySchemaRef { .. })
        ));
    }

    #[test]
    fn test_payload_definition_rules() {
        let missing = spec(users_paths("/users"), serde_json::json!({}));
        let classifier = PathClassifier::new(&missing.paths, &missing.definitions);
        assert!(matches!(
            classifier.is_end_point_fully_terraform_resource_compliant("/users/{id}"),
            Err(AnalyzerError::MissingDefinition { .. })
        ));

        let empty = spec(
            users_paths("/users"),
            serde_json::json!({"User": {"type": "object"}}),
        );
        let classifier = PathClassifier::new(&empty.paths, &empty.definitions);
        assert!(matches!(
            classifier.is_end_point_fully_terraform_resource_compliant("/users/{id}"),
            Err(AnalyzerError::EmptyPayloadSchema { .. })
        ));
    }

    #[test]
    fn test_identifier_requirement() {
        let by_extension: Schema = serde_json::from_value(serde_json::json!({
            "properties": {"name": {"type": "string", "x-terraform-id": true}}
        }))
        .unwrap();
        assert!(validate_resource_schema_definition(&by_extension).is_ok());

        let without: Schema = serde_json::from_value(serde_json::json!({
            "properties": {"name": {"type": "string"}}
        }))
        .unwrap();
        let err = validate_resource_schema_definition(&without).unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingIdentifier));
        assert!(err.to_string().contains("x-terraform-id"));

        let flagged_and_id: Schema = serde_json::from_value(serde_json::json!({
            "properties": {
                "id": {"type": "string"},
                "name": {"type": "string", "x-terraform-id": true}
            }
        }))
        .unwrap();
        assert!(validate_resource_schema_definition(&flagged_and_id).is_ok());

        let two_flagged: Schema = serde_json::from_value(serde_json::json!({
            "properties": {
                "name": {"type": "string", "x-terraform-id": true},
                "slug": {"type": "string", "x-terraform-id": true}
            }
        }))
        .unwrap();
        let err = validate_resource_schema_definition(&two_flagged).unwrap_err();
        assert!(matches!(err, AnalyzerError::MultipleIdentifiers { .. }));
        assert!(err.to_string().contains("'name, slug'"));
    }

    #[test]
    fn test_root_post_with_parameter_ref() {
        let spec = spec(
            serde_json::json!({
                "/users": {
                    "post": {
                        "parameters": [
                            {"$ref": "#/parameters/DryRun"},
                            {"in": "body", "name": "user", "schema": {"$ref": "#/definitions/User"}}
                        ],
                        "responses": {}
                    }
                },
                "/users/{id}": {"get": {"responses": {}}}
            }),
            user_definition(),
        );
        let classifier = PathClassifier::new(&spec.paths, &spec.definitions);

        let err = classifier.validate_root_path("/users").unwrap_err();
        assert!(matches!(err, AnalyzerError::UnexpandedRef { .. }));
        assert!(err.to_string().contains("#/parameters/DryRun"));
    }
}
