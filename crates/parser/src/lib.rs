//! Resource analysis for Swagger 2.0 documents
//!
//! This crate turns a Swagger 2.0 document into the resource model defined in
//! `openapi-resource-analyzer-common` (`ResourceDescriptor`).
//!
//! ## Analysis Strategy
//!
//! Every path of the document is checked independently:
//! - Instance paths (`/users/{id}`) with GET are matched to their root path
//! - The root path's POST body definition becomes the resource schema
//! - Sub-resources get one `<parent>_id` property per parent
//! - Polling and timeouts come from `x-terraform-*` extensions
//!
//! Paths that do not follow the convention are logged and skipped.

mod path_classifier;
mod property_builder;
mod resource_naming;
pub mod swagger;
mod type_mapper;

pub use path_classifier::{
    is_resource_instance_endpoint, validate_resource_schema_definition, CompliantEndpoint,
    PathClassifier,
};
pub use property_builder::{classify_computedness, Computedness, PropertyBuilder};
pub use resource_naming::{
    build_resource_name, descriptor_name, is_sub_resource, is_version_segment, parent_property_names,
    parent_resources, resource_name_from_instance_path, resource_version, ParentResource,
};
pub use swagger::{FileSpecSource, SpecSource, SwaggerParser};
pub use type_mapper::{ListItems, ResolvedType, TypeMapper};

use openapi_resource_analyzer_common::{AnalyzerConfig, ResourceDescriptor, Result};
use std::path::Path;

/// Analyse a Swagger file with the given configuration
///
/// # Arguments
/// * `path` - Swagger 2.0 document, `.json`, `.yaml` or `.yml`
/// * `config` - Analyser configuration
///
/// # Returns
/// * `Vec<ResourceDescriptor>` - Resources in document path order
pub fn analyze_file<P: AsRef<Path>>(
    path: P,
    config: AnalyzerConfig,
) -> Result<Vec<ResourceDescriptor>> {
    SwaggerParser::from_file(path)?.with_config(config).parse()
}
