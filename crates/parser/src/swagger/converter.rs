//! Converts a Swagger document into resource descriptors

use super::extensions::{
    OperationExtensions, ResponseExtensions, RootExtensions, EXT_POLL_COMPLETED_STATUSES,
    EXT_POLL_PENDING_STATUSES,
};
use super::regions::RegionHostTemplate;
use super::types::{Operation, PathItem, SwaggerSpec};
use crate::path_classifier::{CompliantEndpoint, PathClassifier};
use crate::property_builder::PropertyBuilder;
use crate::resource_naming::{
    descriptor_name, parent_resources, same_path_template, ParentResource,
};
use openapi_resource_analyzer_common::{
    AnalyzerConfig, AnalyzerError, CrudOperation, ErrorKind, HttpMethod, OperationRef,
    PollingConfig, PropertyDescriptor, ResourceDescriptor, ResourceOperations, Result, Timeouts,
};
use std::time::{Duration, Instant};

/// Convert every compliant path of a document into resource descriptors
///
/// Non-compliant paths and resources that fail to build are logged and
/// skipped; a document without any compliant path yields an empty list.
pub fn convert_swagger_to_resources(
    spec: &SwaggerSpec,
    config: &AnalyzerConfig,
) -> Result<Vec<ResourceDescriptor>> {
    let started = Instant::now();
    let root_extensions = RootExtensions::parse(&spec.extensions);
    let converter = ResourceConverter {
        spec,
        config,
        root_extensions: &root_extensions,
        classifier: PathClassifier::new(&spec.paths, &spec.definitions),
    };

    let mut resources = Vec::new();
    for path in spec.paths.keys() {
        let endpoint = match converter
            .classifier
            .is_end_point_fully_terraform_resource_compliant(path)
        {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::debug!("Path {} is not a terraform resource: {}", path, e);
                continue;
            }
        };

        match converter.build_resources(path, &endpoint) {
            Ok(built) => resources.extend(built),
            Err(e) if e.kind() == ErrorKind::Compliance => {
                tracing::debug!("Path {} is not a terraform resource: {}", path, e);
            }
            Err(e) => {
                tracing::warn!("Skipping resource for path {}: {}", path, e);
            }
        }
    }

    if config.sort_resources {
        resources.sort_by(|a, b| a.name.cmp(&b.name));
    }

    tracing::info!(
        "Found {} terraform compliant resources in {} ms",
        resources.len(),
        started.elapsed().as_millis()
    );

    Ok(resources)
}

struct ResourceConverter<'a> {
    spec: &'a SwaggerSpec,
    config: &'a AnalyzerConfig,
    root_extensions: &'a RootExtensions,
    classifier: PathClassifier<'a>,
}

impl<'a> ResourceConverter<'a> {
    /// One descriptor, one per region, or none when the resource is excluded
    fn build_resources(
        &self,
        instance_path: &str,
        endpoint: &CompliantEndpoint<'a>,
    ) -> Result<Vec<ResourceDescriptor>> {
        let root_path = endpoint.root_path;
        let post = endpoint
            .root_item
            .post
            .as_ref()
            .ok_or_else(|| AnalyzerError::MissingRootPost {
                path: root_path.to_string(),
            })?;
        let extensions = OperationExtensions::parse(&post.extensions)?;

        if extensions.exclude_resource {
            tracing::debug!("Resource at {} is excluded from the model", root_path);
            return Ok(Vec::new());
        }

        let parents = parent_resources(root_path);
        self.check_parents(&parents)?;

        let name = descriptor_name(
            root_path,
            extensions.resource_name.as_deref(),
            self.config.append_version_on_name_override,
        );

        let builder = PropertyBuilder::new(&self.spec.definitions, self.config.max_schema_depth);
        let mut schema = builder.build_schema(endpoint.payload)?;
        schema.properties.extend(
            parents
                .iter()
                .map(|parent| PropertyDescriptor::parent_id(parent.property_name())),
        );

        let instance = endpoint.instance_item;
        let operations = ResourceOperations {
            create: OperationRef::new(root_path, HttpMethod::Post),
            read: OperationRef::new(instance_path, HttpMethod::Get),
            update: instance
                .put
                .as_ref()
                .map(|_| OperationRef::new(instance_path, HttpMethod::Put)),
            delete: instance
                .delete
                .as_ref()
                .map(|_| OperationRef::new(instance_path, HttpMethod::Delete)),
        };

        let mut polling = polling_configs(CrudOperation::Create, post)?;
        if let Some(put) = &instance.put {
            polling.extend(polling_configs(CrudOperation::Update, put)?);
        }
        if let Some(delete) = &instance.delete {
            polling.extend(polling_configs(CrudOperation::Delete, delete)?);
        }

        let timeouts = Timeouts {
            create: extensions.resource_timeout,
            read: operation_timeout(instance.get.as_ref())?,
            update: operation_timeout(instance.put.as_ref())?,
            delete: operation_timeout(instance.delete.as_ref())?,
        };

        let descriptor = ResourceDescriptor {
            name,
            root_path: root_path.to_string(),
            instance_path: instance_path.to_string(),
            schema,
            operations,
            polling,
            timeouts,
            parent_resource_names: parents.into_iter().map(|parent| parent.name).collect(),
            host: extensions.resource_host.clone(),
            is_multi_region: false,
            region: None,
            regions: Vec::new(),
        };

        let Some(template) = extensions
            .resource_host
            .as_deref()
            .and_then(RegionHostTemplate::parse)
        else {
            return Ok(vec![descriptor]);
        };

        let regions = template.regions(self.root_extensions)?;
        tracing::debug!(
            "Resource {} is multi-region: {}",
            descriptor.name,
            regions.join(", ")
        );

        Ok(regions
            .iter()
            .map(|region| ResourceDescriptor {
                name: format!("{}_{}", descriptor.name, region),
                host: Some(template.resolve(region)),
                is_multi_region: true,
                region: Some(region.clone()),
                regions: regions.clone(),
                ..descriptor.clone()
            })
            .collect())
    }

    /// Every ancestor instance path must exist; the immediate parent's root
    /// path must exist and must not be excluded
    fn check_parents(&self, parents: &[ParentResource]) -> Result<()> {
        for parent in parents {
            if self.path_item(&parent.instance_path).is_none() {
                return Err(AnalyzerError::MissingParentInstancePath {
                    path: parent.instance_path.clone(),
                });
            }
        }

        let Some(parent) = parents.last() else {
            return Ok(());
        };

        let root_item = self
            .path_item(&parent.root_path)
            .ok_or_else(|| AnalyzerError::MissingParentRootPath {
                path: parent.root_path.clone(),
            })?;

        if let Some(post) = &root_item.post {
            if OperationExtensions::parse(&post.extensions)?.exclude_resource {
                return Err(AnalyzerError::ExcludedParent {
                    path: parent.root_path.clone(),
                });
            }
        }

        Ok(())
    }

    /// Path item declared under the same template, whatever its parameter names
    fn path_item(&self, template: &str) -> Option<&'a PathItem> {
        let paths = &self.spec.paths;
        paths.get(template).or_else(|| {
            paths
                .iter()
                .find(|(path, _)| same_path_template(path, template))
                .map(|(_, item)| item)
        })
    }
}

/// Polling configuration for every numeric response code with polling enabled
fn polling_configs(operation: CrudOperation, op: &Operation) -> Result<Vec<PollingConfig>> {
    let mut configs = Vec::new();

    for (code, response) in &op.responses {
        let Ok(status_code) = code.parse::<u16>() else {
            continue;
        };

        let extensions = ResponseExtensions::parse(&response.extensions)?;
        if extensions.poll_enabled != Some(true) {
            continue;
        }

        let missing = |extension: &str| AnalyzerError::MissingPollingStatuses {
            status_code,
            extension: extension.to_string(),
        };

        let pending_statuses = extensions
            .poll_pending_statuses
            .ok_or_else(|| missing(EXT_POLL_PENDING_STATUSES))?;

        // Deleted resources are detected by a 404, not by a target status
        let target_statuses = match extensions.poll_completed_statuses {
            Some(statuses) => statuses,
            None if operation == CrudOperation::Delete => Vec::new(),
            None => return Err(missing(EXT_POLL_COMPLETED_STATUSES)),
        };

        configs.push(PollingConfig {
            operation,
            status_code,
            enabled: true,
            target_statuses,
            pending_statuses,
        });
    }

    Ok(configs)
}

fn operation_timeout(op: Option<&Operation>) -> Result<Option<Duration>> {
    match op {
        Some(op) => Ok(OperationExtensions::parse(&op.extensions)?.resource_timeout),
        None => Ok(None),
    }
}
