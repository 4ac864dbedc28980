//! Builds normalised property descriptors from Swagger schema properties

use crate::swagger::{PropertyExtensions, Schema};
use crate::type_mapper::{ListItems, ResolvedType, TypeMapper};
use indexmap::IndexMap;
use openapi_resource_analyzer_common::{
    to_snake_case, AnalyzerError, PropertyConflict, PropertyDescriptor, PropertyType, Result,
    SchemaDefinition,
};

/// How the value of a property becomes known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Computedness {
    /// Supplied by the user, or left unset
    NotComputed,
    /// Read-only, always determined by the server
    ReadOnly,
    /// Optional, with a default known at plan time
    OptionalWithDefault,
    /// Optional, value unknown until apply (`x-terraform-computed`)
    OptionalUnknown,
}

impl Computedness {
    pub fn is_computed(self) -> bool {
        self != Computedness::NotComputed
    }
}

/// Decide how a property is computed, or which flag rule it breaks
///
/// | required | readOnly | default | computed ext | outcome                       |
/// |----------|----------|---------|--------------|-------------------------------|
/// | yes      | yes      | any     | any          | RequiredReadOnly              |
/// | yes      | no       | any     | any          | NotComputed                   |
/// | no       | no       | yes     | yes          | ComputedExtensionWithDefault  |
/// | no       | no       | yes     | no           | OptionalWithDefault           |
/// | no       | yes      | any     | yes          | ComputedExtensionReadOnly     |
/// | no       | no       | no      | yes          | OptionalUnknown               |
/// | no       | yes      | any     | no           | ReadOnly                      |
/// | no       | no       | no      | no           | NotComputed                   |
pub fn classify_computedness(
    required: bool,
    read_only: bool,
    has_default: bool,
    computed_extension: bool,
) -> std::result::Result<Computedness, PropertyConflict> {
    if required && read_only {
        return Err(PropertyConflict::RequiredReadOnly);
    }
    if required {
        return Ok(Computedness::NotComputed);
    }

    if !read_only && has_default {
        if computed_extension {
            return Err(PropertyConflict::ComputedExtensionWithDefault);
        }
        return Ok(Computedness::OptionalWithDefault);
    }

    if computed_extension {
        if read_only {
            return Err(PropertyConflict::ComputedExtensionReadOnly);
        }
        return Ok(Computedness::OptionalUnknown);
    }

    if read_only {
        Ok(Computedness::ReadOnly)
    } else {
        Ok(Computedness::NotComputed)
    }
}

/// Converts schema properties into `PropertyDescriptor`s
pub struct PropertyBuilder<'a> {
    types: TypeMapper<'a>,
    max_depth: usize,
}

impl<'a> PropertyBuilder<'a> {
    pub fn new(definitions: &'a IndexMap<String, Schema>, max_depth: usize) -> Self {
        Self {
            types: TypeMapper::new(definitions),
            max_depth,
        }
    }

    /// Build every property of an object schema, in declaration order
    pub fn build_schema(&self, schema: &'a Schema) -> Result<SchemaDefinition> {
        self.build_schema_at(schema, 0)
    }

    /// Build a single property
    pub fn build_property(
        &self,
        name: &str,
        schema: &'a Schema,
        required_names: &[String],
    ) -> Result<PropertyDescriptor> {
        self.build_property_at(name, schema, required_names, 0)
    }

    fn build_schema_at(&self, schema: &'a Schema, depth: usize) -> Result<SchemaDefinition> {
        if depth > self.max_depth {
            return Err(AnalyzerError::SchemaTooDeep {
                max_depth: self.max_depth,
            });
        }

        let properties = schema
            .properties
            .iter()
            .map(|(name, property)| self.build_property_at(name, property, &schema.required, depth))
            .collect::<Result<Vec<_>>>()?;

        Ok(SchemaDefinition::new(properties))
    }

    fn build_property_at(
        &self,
        name: &str,
        schema: &'a Schema,
        required_names: &[String],
        depth: usize,
    ) -> Result<PropertyDescriptor> {
        let property_type = self.property_type(name, schema, depth)?;

        let extensions =
            PropertyExtensions::parse(&schema.extensions).map_err(|e| AnalyzerError::Property {
                property: name.to_string(),
                source: Box::new(e),
            })?;

        let required = required_names.iter().any(|r| r == name);
        let read_only = schema.read_only;
        let computedness = classify_computedness(
            required,
            read_only,
            schema.default.is_some(),
            extensions.computed,
        )
        .map_err(|conflict| AnalyzerError::PropertyConflict {
            property: name.to_string(),
            conflict,
        })?;

        Ok(PropertyDescriptor {
            name: name.to_string(),
            preferred_name: extensions
                .field_name
                .unwrap_or_else(|| to_snake_case(name)),
            property_type,
            required,
            read_only,
            computed: computedness.is_computed(),
            force_new: extensions.force_new,
            sensitive: extensions.sensitive,
            immutable: extensions.immutable,
            is_identifier: extensions.id,
            is_status_identifier: extensions.field_status,
            ignore_items_order: extensions.ignore_order,
            parent_property: false,
            default: match computedness {
                Computedness::OptionalUnknown => None,
                _ => schema.default.clone(),
            },
            description: schema.description.clone(),
        })
    }

    fn property_type(&self, name: &str, schema: &'a Schema, depth: usize) -> Result<PropertyType> {
        let wrap = |e: AnalyzerError| {
            let property = name.to_string();
            let source = Box::new(e);
            if schema.is_type("array") {
                AnalyzerError::ArrayProperty { property, source }
            } else if TypeMapper::is_object(schema) {
                AnalyzerError::ObjectProperty { property, source }
            } else {
                AnalyzerError::Property { property, source }
            }
        };

        let resolved = self.types.resolve(schema).map_err(wrap)?;

        let property_type = match resolved {
            ResolvedType::String => PropertyType::String,
            ResolvedType::Integer => PropertyType::Integer,
            ResolvedType::Float => PropertyType::Float,
            ResolvedType::Boolean => PropertyType::Boolean,
            ResolvedType::Object(nested) => {
                PropertyType::Object(self.build_schema_at(nested, depth + 1).map_err(wrap)?)
            }
            ResolvedType::List(items) => {
                let item_type = match items {
                    ListItems::String => PropertyType::String,
                    ListItems::Integer => PropertyType::Integer,
                    ListItems::Float => PropertyType::Float,
                    ListItems::Boolean => PropertyType::Boolean,
                    ListItems::Object(nested) => {
                        PropertyType::Object(self.build_schema_at(nested, depth + 1).map_err(wrap)?)
                    }
                };
                PropertyType::List(Box::new(item_type))
            }
        };

        Ok(property_type)
    }
}
