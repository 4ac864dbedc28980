//! Type mapping from Swagger schemas to semantic property types
//!
//! Arrays are checked first, then objects (inline properties or a `$ref`
//! into the definitions table), then primitives.

use crate::swagger::{resolve_definition_ref, Schema};
use indexmap::IndexMap;
use openapi_resource_analyzer_common::{AnalyzerError, Result};

/// Semantic type of a raw schema node
///
/// Objects carry the schema whose `properties` describe them, which is the
/// referenced definition when the node is a `$ref`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedType<'a> {
    String,
    Integer,
    Float,
    Boolean,
    Object(&'a Schema),
    /// Item type is a primitive or an object, never another list
    List(ListItems<'a>),
}

/// Item type of an array schema
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListItems<'a> {
    String,
    Integer,
    Float,
    Boolean,
    Object(&'a Schema),
}

/// Maps schema nodes to `ResolvedType`
pub struct TypeMapper<'a> {
    definitions: &'a IndexMap<String, Schema>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(definitions: &'a IndexMap<String, Schema>) -> Self {
        Self { definitions }
    }

    /// Resolve the semantic type of a schema node
    pub fn resolve(&self, schema: &'a Schema) -> Result<ResolvedType<'a>> {
        if schema.is_type("array") {
            return self.resolve_array(schema).map(ResolvedType::List);
        }

        if let Some(object) = self.resolve_object(schema)? {
            return Ok(ResolvedType::Object(object));
        }

        Self::map_primitive(schema).ok_or_else(|| AnalyzerError::UnsupportedType {
            types: schema.type_tokens(),
        })
    }

    /// Whether the schema is treated as an object (typed `object` or a `$ref`)
    pub fn is_object(schema: &Schema) -> bool {
        schema.is_type("object") || schema.reference().is_some()
    }

    fn resolve_object(&self, schema: &'a Schema) -> Result<Option<&'a Schema>> {
        if !Self::is_object(schema) {
            return Ok(None);
        }

        if !schema.properties.is_empty() {
            return Ok(Some(schema));
        }

        match schema.reference() {
            Some(reference) => resolve_definition_ref(self.definitions, reference).map(Some),
            None => Err(AnalyzerError::MissingObjectSchema),
        }
    }

    fn resolve_array(&self, schema: &'a Schema) -> Result<ListItems<'a>> {
        let items = schema
            .items
            .as_deref()
            .ok_or(AnalyzerError::MissingArrayItems)?;

        if items.is_type("array") {
            return Err(AnalyzerError::NestedArrayItems);
        }

        if let Some(object) = self.resolve_object(items)? {
            return Ok(ListItems::Object(object));
        }

        match Self::map_primitive(items) {
            Some(ResolvedType::String) => Ok(ListItems::String),
            Some(ResolvedType::Integer) => Ok(ListItems::Integer),
            Some(ResolvedType::Float) => Ok(ListItems::Float),
            Some(ResolvedType::Boolean) => Ok(ListItems::Boolean),
            _ => Err(AnalyzerError::UnsupportedType {
                types: items.type_tokens(),
            }),
        }
    }

    fn map_primitive(schema: &Schema) -> Option<ResolvedType<'a>> {
        if schema.is_type("string") {
            Some(ResolvedType::String)
        } else if schema.is_type("integer") {
            Some(ResolvedType::Integer)
        } else if schema.is_type("number") {
            Some(ResolvedType::Float)
        } else if schema.is_type("boolean") {
            Some(ResolvedType::Boolean)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    fn definitions() -> IndexMap<String, Schema> {
        let mut definitions = IndexMap::new();
        definitions.insert(
            "Rule".to_string(),
            schema(r#"{"type": "object", "properties": {"port": {"type": "integer"}}}"#),
        );
        definitions
    }

    #[test]
    fn test_map_basic_types() {
        let definitions = IndexMap::new();
        let mapper = TypeMapper::new(&definitions);

        let string = Schema::of_type("string");
        let integer = Schema::of_type("integer");
        let number = Schema::of_type("number");
        let boolean = Schema::of_type("boolean");

        assert_eq!(mapper.resolve(&string).unwrap(), ResolvedType::String);
        assert_eq!(mapper.resolve(&integer).unwrap(), ResolvedType::Integer);
        assert_eq!(mapper.resolve(&number).unwrap(), ResolvedType::Float);
        assert_eq!(mapper.resolve(&boolean).unwrap(), ResolvedType::Boolean);
    }

    #[test]
    fn test_unsupported_type_names_token() {
        let definitions = IndexMap::new();
        let mapper = TypeMapper::new(&definitions);

        let file = Schema::of_type("file");
        let err = mapper.resolve(&file).unwrap_err();
        assert_eq!(err.to_string(), "non supported '[file]' type");

        let untyped = Schema::default();
        let err = mapper.resolve(&untyped).unwrap_err();
        assert_eq!(err.to_string(), "non supported '[]' type");
    }

    #[test]
    fn test_map_arrays() {
        let definitions = definitions();
        let mapper = TypeMapper::new(&definitions);

        let strings = schema(r#"{"type": "array", "items": {"type": "string"}}"#);
        assert_eq!(
            mapper.resolve(&strings).unwrap(),
            ResolvedType::List(ListItems::String)
        );

        let refs = schema(r##"{"type": "array", "items": {"$ref": "#/definitions/Rule"}}"##);
        assert_eq!(
            mapper.resolve(&refs).unwrap(),
            ResolvedType::List(ListItems::Object(&definitions["Rule"]))
        );

        let inline = schema(
            r#"{"type": "array", "items": {"type": "object", "properties": {"name": {"type": "string"}}}}"#,
        );
        assert!(matches!(
            mapper.resolve(&inline).unwrap(),
            ResolvedType::List(ListItems::Object(items)) if items.properties.contains_key("name")
        ));
    }

    #[test]
    fn test_array_errors() {
        let definitions = definitions();
        let mapper = TypeMapper::new(&definitions);

        let missing = schema(r#"{"type": "array"}"#);
        assert!(matches!(
            mapper.resolve(&missing),
            Err(AnalyzerError::MissingArrayItems)
        ));

        let nested = schema(r#"{"type": "array", "items": {"type": "array", "items": {"type": "string"}}}"#);
        assert!(matches!(
            mapper.resolve(&nested),
            Err(AnalyzerError::NestedArrayItems)
        ));
    }

    #[test]
    fn test_map_objects() {
        let definitions = definitions();
        let mapper = TypeMapper::new(&definitions);

        let by_ref = schema(r##"{"$ref": "#/definitions/Rule"}"##);
        assert_eq!(
            mapper.resolve(&by_ref).unwrap(),
            ResolvedType::Object(&definitions["Rule"])
        );

        let missing_ref = schema(r##"{"type": "object", "$ref": "#/definitions/Nope"}"##);
        assert!(matches!(
            mapper.resolve(&missing_ref),
            Err(AnalyzerError::MissingDefinition { .. })
        ));

        let empty = schema(r#"{"type": "object"}"#);
        assert!(matches!(
            mapper.resolve(&empty),
            Err(AnalyzerError::MissingObjectSchema)
        ));
    }
}
