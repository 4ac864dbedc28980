//! Property descriptors for resource schemas

use serde::Serialize;

/// Semantic type of a schema property
///
/// Lists never nest directly: the item type of a `List` is a primitive or an
/// `Object`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    String,
    Integer,
    Float,
    Boolean,
    List(Box<PropertyType>),
    Object(SchemaDefinition),
}

impl PropertyType {
    /// Type token as used in Swagger documents
    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Integer => "integer",
            PropertyType::Float => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::List(_) => "list",
            PropertyType::Object(_) => "object",
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, PropertyType::List(_) | PropertyType::Object(_))
    }

    /// Nested schema of an object or list-of-object property
    pub fn nested_schema(&self) -> Option<&SchemaDefinition> {
        match self {
            PropertyType::Object(schema) => Some(schema),
            PropertyType::List(items) => items.nested_schema(),
            _ => None,
        }
    }
}

/// A normalised property of a resource (or nested object) schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    /// Name as declared in the document
    pub name: String,

    /// Terraform compliant name: the `x-terraform-field-name` override or the
    /// snake_case form of `name`
    pub preferred_name: String,

    #[serde(rename = "type")]
    pub property_type: PropertyType,

    pub required: bool,
    pub read_only: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    pub immutable: bool,
    pub is_identifier: bool,
    pub is_status_identifier: bool,

    /// List item order is not significant
    pub ignore_items_order: bool,

    /// Synthesised `<parent>_id` property of a sub-resource
    pub parent_property: bool,

    /// Default value, known at plan time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyDescriptor {
    /// Create a plain optional property of the given type
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        let name = name.into();
        Self {
            preferred_name: to_snake_case(&name),
            name,
            property_type,
            required: false,
            read_only: false,
            computed: false,
            force_new: false,
            sensitive: false,
            immutable: false,
            is_identifier: false,
            is_status_identifier: false,
            ignore_items_order: false,
            parent_property: false,
            default: None,
            description: None,
        }
    }

    /// Parent-scope identifier property injected into sub-resource schemas
    pub fn parent_id(name: impl Into<String>) -> Self {
        Self {
            read_only: true,
            computed: true,
            parent_property: true,
            ..Self::new(name, PropertyType::String)
        }
    }

    pub fn is_optional(&self) -> bool {
        !self.required
    }

    /// Optional property whose value is filled in by the server when omitted
    pub fn is_optional_computed(&self) -> bool {
        !self.required && !self.read_only && self.computed
    }
}

/// Ordered set of properties making up a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaDefinition {
    pub properties: Vec<PropertyDescriptor>,
}

impl SchemaDefinition {
    pub fn new(properties: Vec<PropertyDescriptor>) -> Self {
        Self { properties }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The property that uniquely identifies the resource
    ///
    /// A property flagged with `x-terraform-id` wins over one literally named `id`.
    pub fn identifier(&self) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|p| p.is_identifier)
            .or_else(|| self.property("id"))
    }

    /// The property carrying the resource status used by polling
    pub fn status_identifier(&self) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|p| p.is_status_identifier)
            .or_else(|| self.property("status"))
    }

    /// Preferred names of the properties that can not change after creation
    pub fn immutable_property_names(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|p| p.immutable)
            .map(|p| p.preferred_name.as_str())
            .collect()
    }
}

/// Convert PascalCase or camelCase to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            // Split before an uppercase letter that follows a lowercase letter
            // or digit, or that starts a new word inside an acronym (HTTPServer)
            let should_add_underscore = i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase()));

            if should_add_underscore && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch == '-' || ch == ' ' || ch == '.' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(ch);
        }
    }

    while result.contains("__") {
        result = result.replace("__", "_");
    }

    result.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("labelName"), "label_name");
        assert_eq!(to_snake_case("CreatedAt"), "created_at");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("ipV4Address"), "ip_v4_address");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("some-field"), "some_field");
        assert_eq!(to_snake_case("__id__"), "id");
    }

    #[test]
    fn test_parent_id_property_flags() {
        let prop = PropertyDescriptor::parent_id("cdns_v1_id");
        assert_eq!(prop.property_type, PropertyType::String);
        assert!(prop.read_only);
        assert!(prop.computed);
        assert!(!prop.required);
        assert!(prop.parent_property);
        assert!(!prop.is_optional_computed());
    }

    #[test]
    fn test_identifier_precedence() {
        let id = PropertyDescriptor::new("id", PropertyType::String);
        let mut name = PropertyDescriptor::new("name", PropertyType::String);
        name.is_identifier = true;

        let schema = SchemaDefinition::new(vec![id.clone(), name]);
        assert_eq!(schema.identifier().map(|p| p.name.as_str()), Some("name"));

        let schema = SchemaDefinition::new(vec![id]);
        assert_eq!(schema.identifier().map(|p| p.name.as_str()), Some("id"));
    }

    #[test]
    fn test_immutable_property_names_use_preferred_names() {
        let mut label = PropertyDescriptor::new("labelName", PropertyType::String);
        label.immutable = true;
        let mut size = PropertyDescriptor::new("size", PropertyType::Integer);
        size.immutable = true;
        size.preferred_name = "disk_size".to_string();
        let other = PropertyDescriptor::new("other", PropertyType::Boolean);

        let schema = SchemaDefinition::new(vec![label, other, size]);
        assert_eq!(
            schema.immutable_property_names(),
            vec!["label_name", "disk_size"]
        );
    }

    #[test]
    fn test_nested_schema_through_list() {
        let nested = SchemaDefinition::new(vec![PropertyDescriptor::new(
            "port",
            PropertyType::Integer,
        )]);
        let list = PropertyType::List(Box::new(PropertyType::Object(nested.clone())));
        assert_eq!(list.nested_schema(), Some(&nested));
        assert_eq!(list.name(), "list");
        assert!(PropertyType::List(Box::new(PropertyType::String))
            .nested_schema()
            .is_none());
    }
}
