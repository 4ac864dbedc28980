//! Common types and utilities for the OpenAPI Resource Analyzer
//!
//! This crate contains the resource model produced by the analyser (resource
//! and property descriptors, polling and timeout metadata, URL builders), the
//! shared error type and the analyser configuration.

mod config;
mod property;
mod resource;

pub use config::AnalyzerConfig;
pub use property::{to_snake_case, PropertyDescriptor, PropertyType, SchemaDefinition};
pub use resource::{
    resolve_path_template, CrudOperation, HttpMethod, OperationRef, PollingConfig,
    ResourceDescriptor, ResourceOperations, ServiceEndpoint, Timeouts,
};

use std::fmt;
use thiserror::Error;

/// Extension marking a property whose value is only known after apply
pub const EXT_COMPUTED: &str = "x-terraform-computed";

/// Extension marking a property as the resource identifier
pub const EXT_ID: &str = "x-terraform-id";

/// Extension on a create operation that removes the resource from the model
pub const EXT_EXCLUDE_RESOURCE: &str = "x-terraform-exclude-resource";

/// Broad classification of analysis failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document could not be read or deserialised
    Load,
    /// Malformed literal: type token, ref, duration, extension value
    Structural,
    /// The path does not follow the collection/instance resource convention
    Compliance,
    /// Document-level configuration does not satisfy a resource's needs
    Configuration,
    /// A property violates a flag mutual-exclusion rule
    Validation,
}

/// Flag combinations a property is not allowed to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyConflict {
    RequiredReadOnly,
    ComputedExtensionWithDefault,
    ComputedExtensionReadOnly,
}

impl fmt::Display for PropertyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyConflict::RequiredReadOnly => {
                write!(f, "a required property cannot be readOnly too")
            }
            PropertyConflict::ComputedExtensionWithDefault => write!(
                f,
                "optional computed properties with default attributes should not have '{}' extension too",
                EXT_COMPUTED
            ),
            PropertyConflict::ComputedExtensionReadOnly => write!(
                f,
                "optional computed properties marked with '{}' can not be readOnly",
                EXT_COMPUTED
            ),
        }
    }
}

/// Errors that can occur while analysing a document
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("non supported '{types}' type")]
    UnsupportedType { types: String },

    #[error("failed to process property '{property}': {source}")]
    Property {
        property: String,
        #[source]
        source: Box<AnalyzerError>,
    },

    #[error("failed to process object type property '{property}': {source}")]
    ObjectProperty {
        property: String,
        #[source]
        source: Box<AnalyzerError>,
    },

    #[error("failed to process array type property '{property}': {source}")]
    ArrayProperty {
        property: String,
        #[source]
        source: Box<AnalyzerError>,
    },

    #[error("array property is missing items schema definition")]
    MissingArrayItems,

    #[error("array property can not have items of type 'array'")]
    NestedArrayItems,

    #[error("object is missing the nested schema definition or the ref is pointing to a non existing schema definition")]
    MissingObjectSchema,

    #[error("missing schema definition in the swagger file with the supplied ref '{reference}'")]
    MissingDefinition { reference: String },

    #[error("ref '{reference}' was not expanded by the document loader, only local '#/definitions/<name>' refs are supported")]
    UnexpandedRef { reference: String },

    #[error("schema nesting exceeds the maximum supported depth of {max_depth}")]
    SchemaTooDeep { max_depth: usize },

    #[error("failed to process property '{property}': {conflict}")]
    PropertyConflict {
        property: String,
        conflict: PropertyConflict,
    },

    #[error("extension '{extension}' must be a {expected}")]
    InvalidExtension {
        extension: String,
        expected: &'static str,
    },

    #[error("invalid duration value: '{value}'. The value must be a sequence of decimal numbers each with optional fraction and a unit suffix (negative durations are not allowed). The value must be formatted either in seconds (s), minutes (m) or hours (h)")]
    InvalidDuration { value: String },

    #[error("response '{status_code}' missing required extension '{extension}' for the polling mechanism to work")]
    MissingPollingStatuses { status_code: u16, extension: String },

    #[error("path '{path}' is not a resource instance path")]
    NotInstancePath { path: String },

    #[error("resource instance path '{path}' missing required GET operation")]
    MissingInstanceGet { path: String },

    #[error("resource instance path '{path}' missing resource root path")]
    MissingRootPath { path: String },

    #[error("resource root path '{path}' missing required POST operation")]
    MissingRootPost { path: String },

    #[error("resource root path '{path}' POST operation missing body parameter")]
    MissingBodyParameter { path: String },

    #[error("resource root path '{path}' POST operation has multiple body parameters ({count})")]
    MultipleBodyParameters { path: String, count: usize },

    #[error("resource root path '{path}' POST body parameter schema is missing a '$ref'")]
    MissingBodySchemaRef { path: String },

    #[error("resource payload definition '{reference}' has no properties")]
    EmptyPayloadSchema { reference: String },

    #[error("resource schema is missing a property that uniquely identifies the resource, either a property named 'id' or a property with the extension '{ext}' set to true", ext = EXT_ID)]
    MissingIdentifier,

    #[error("resource schema has more than one property marked with '{ext}': '{properties}'", ext = EXT_ID)]
    MultipleIdentifiers { properties: String },

    #[error("malformed path parameter in path template '{path}'")]
    MalformedPathTemplate { path: String },

    #[error("parent instance path '{path}' missing from the swagger file")]
    MissingParentInstancePath { path: String },

    #[error("parent root path '{path}' missing from the swagger file")]
    MissingParentRootPath { path: String },

    #[error("parent resource root path '{path}' is marked with '{ext}'", ext = EXT_EXCLUDE_RESOURCE)]
    ExcludedParent { path: String },

    #[error("missing matching '{extension}' root level region extension for the multi-region resource")]
    MissingRegionExtension { extension: String },

    #[error("root level extension '{extension}' must be a comma separated string of regions")]
    InvalidRegionExtension { extension: String },

    #[error("could not parse any region from the '{extension}' root level extension")]
    EmptyRegions { extension: String },

    #[error("could not resolve sub-resource path correctly '{path}' with the given ids - missing ids to resolve the path params properly: expected {expected}, got {got}")]
    MissingPathIds {
        path: String,
        expected: usize,
        got: usize,
    },

    #[error("could not resolve sub-resource path correctly '{path}' with the given ids - more ids than path params: expected {expected}, got {got}")]
    ExtraPathIds {
        path: String,
        expected: usize,
        got: usize,
    },

    #[error("host can not be empty: neither the document nor the resource declares a host")]
    MissingHost,

    #[error("unsupported swagger version '{version}', only '2.0' documents are supported")]
    UnsupportedVersion { version: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AnalyzerError {
    /// Classify the error, looking through property wrappers to the root cause
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Property { source, .. }
            | Self::ObjectProperty { source, .. }
            | Self::ArrayProperty { source, .. } => source.kind(),
            Self::PropertyConflict { .. } => ErrorKind::Validation,
            Self::NotInstancePath { .. }
            | Self::MissingInstanceGet { .. }
            | Self::MissingRootPath { .. }
            | Self::MissingRootPost { .. }
            | Self::MissingBodyParameter { .. }
            | Self::MultipleBodyParameters { .. }
            | Self::MissingBodySchemaRef { .. }
            | Self::EmptyPayloadSchema { .. }
            | Self::MissingIdentifier
            | Self::MultipleIdentifiers { .. }
            | Self::MissingParentInstancePath { .. }
            | Self::MissingParentRootPath { .. }
            | Self::ExcludedParent { .. } => ErrorKind::Compliance,
            Self::MissingRegionExtension { .. }
            | Self::InvalidRegionExtension { .. }
            | Self::EmptyRegions { .. }
            | Self::MissingHost => ErrorKind::Configuration,
            Self::UnsupportedVersion { .. }
            | Self::Parse(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => ErrorKind::Load,
            _ => ErrorKind::Structural,
        }
    }
}

/// Result type for analyser operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;
