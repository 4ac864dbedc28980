//! Resource descriptors and the URL builders consumed by provider wiring

use crate::{AnalyzerError, PropertyDescriptor, Result, SchemaDefinition};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// CRUD operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudOperation {
    Create,
    Read,
    Update,
    Delete,
}

/// HTTP methods the analyser looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// Handle to an operation node owned by the loaded document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OperationRef {
    pub path: String,
    pub method: HttpMethod,
}

impl OperationRef {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

impl fmt::Display for OperationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Operations used to build requests for a resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceOperations {
    /// POST on the root path
    pub create: OperationRef,
    /// GET on the instance path
    pub read: OperationRef,
    /// PUT on the instance path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<OperationRef>,
    /// DELETE on the instance path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<OperationRef>,
}

impl ResourceOperations {
    pub fn get(&self, operation: CrudOperation) -> Option<&OperationRef> {
        match operation {
            CrudOperation::Create => Some(&self.create),
            CrudOperation::Read => Some(&self.read),
            CrudOperation::Update => self.update.as_ref(),
            CrudOperation::Delete => self.delete.as_ref(),
        }
    }
}

/// Polling behaviour attached to one response code of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollingConfig {
    pub operation: CrudOperation,
    pub status_code: u16,
    pub enabled: bool,
    /// Terminal statuses
    pub target_statuses: Vec<String>,
    /// In-progress statuses
    pub pending_statuses: Vec<String>,
}

/// Per-operation timeouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timeouts {
    pub create: Option<Duration>,
    pub read: Option<Duration>,
    pub update: Option<Duration>,
    pub delete: Option<Duration>,
}

impl Timeouts {
    pub fn get(&self, operation: CrudOperation) -> Option<Duration> {
        match operation {
            CrudOperation::Create => self.create,
            CrudOperation::Read => self.read,
            CrudOperation::Update => self.update,
            CrudOperation::Delete => self.delete,
        }
    }
}

/// Document-level endpoint information used for URL building
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceEndpoint {
    pub host: Option<String>,
    pub base_path: Option<String>,
    pub schemes: Vec<String>,
}

impl ServiceEndpoint {
    /// `https` when declared, `http` otherwise
    pub fn scheme(&self) -> &'static str {
        if self.schemes.iter().any(|s| s.eq_ignore_ascii_case("https")) {
            "https"
        } else {
            "http"
        }
    }

    /// Base path normalised to either empty or `/segment...`
    pub fn normalized_base_path(&self) -> String {
        match self.base_path.as_deref() {
            None | Some("") | Some("/") => String::new(),
            Some(base) if base.starts_with('/') => base.to_string(),
            Some(base) => format!("/{}", base),
        }
    }
}

/// A CRUD resource derived from a collection/instance path pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    /// Terraform style name, parent-prefixed for sub-resources and
    /// region-suffixed for multi-region copies (`lbs_v1_rst1`)
    pub name: String,
    pub root_path: String,
    pub instance_path: String,
    pub schema: SchemaDefinition,
    pub operations: ResourceOperations,
    pub polling: Vec<PollingConfig>,
    pub timeouts: Timeouts,
    /// Ancestor names, outermost first
    pub parent_resource_names: Vec<String>,
    /// Override host, region-resolved for multi-region resources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub is_multi_region: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
}

impl ResourceDescriptor {
    pub fn identifier(&self) -> Option<&PropertyDescriptor> {
        self.schema.identifier()
    }

    pub fn status_identifier(&self) -> Option<&PropertyDescriptor> {
        self.schema.status_identifier()
    }

    pub fn immutable_property_names(&self) -> Vec<&str> {
        self.schema.immutable_property_names()
    }

    pub fn is_sub_resource(&self) -> bool {
        !self.parent_resource_names.is_empty()
    }

    /// Names of the injected parent-scope identifier properties
    pub fn parent_property_names(&self) -> Vec<String> {
        self.parent_resource_names
            .iter()
            .map(|parent| format!("{}_id", parent))
            .collect()
    }

    /// Enabled polling configuration for an operation's response code
    pub fn polling_for(&self, operation: CrudOperation, status_code: u16) -> Option<&PollingConfig> {
        self.polling
            .iter()
            .find(|p| p.operation == operation && p.status_code == status_code && p.enabled)
    }

    /// Root path with parent identifiers substituted, outermost first
    pub fn resource_path(&self, parent_ids: &[&str]) -> Result<String> {
        resolve_path_template(&self.root_path, parent_ids)
    }

    /// Collection URL of the resource
    pub fn resource_url(&self, endpoint: &ServiceEndpoint, parent_ids: &[&str]) -> Result<String> {
        let host = self
            .host
            .as_deref()
            .or(endpoint.host.as_deref())
            .filter(|h| !h.is_empty())
            .ok_or(AnalyzerError::MissingHost)?;
        let path = self.resource_path(parent_ids)?;

        Ok(format!(
            "{}://{}{}{}",
            endpoint.scheme(),
            host,
            endpoint.normalized_base_path(),
            path
        ))
    }

    /// URL of a single resource instance
    pub fn resource_instance_url(
        &self,
        endpoint: &ServiceEndpoint,
        parent_ids: &[&str],
        id: &str,
    ) -> Result<String> {
        let url = self.resource_url(endpoint, parent_ids)?;
        if url.ends_with('/') {
            Ok(format!("{}{}", url, id))
        } else {
            Ok(format!("{}/{}", url, id))
        }
    }
}

/// Substitute `{param}` placeholders in a path template positionally
///
/// Ids containing `/` are escaped so they stay within one segment. The number
/// of ids must match the number of placeholders exactly.
pub fn resolve_path_template(template: &str, ids: &[&str]) -> Result<String> {
    let placeholders = template.matches('{').count();

    if ids.len() < placeholders {
        return Err(AnalyzerError::MissingPathIds {
            path: template.to_string(),
            expected: placeholders,
            got: ids.len(),
        });
    }
    if ids.len() > placeholders {
        return Err(AnalyzerError::ExtraPathIds {
            path: template.to_string(),
            expected: placeholders,
            got: ids.len(),
        });
    }

    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;
    for id in ids {
        let Some((open, close)) = rest
            .find('{')
            .and_then(|open| rest[open..].find('}').map(|len| (open, open + len)))
        else {
            return Err(AnalyzerError::MalformedPathTemplate {
                path: template.to_string(),
            });
        };
        resolved.push_str(&rest[..open]);
        resolved.push_str(&id.replace('/', "%2F"));
        rest = &rest[close + 1..];
    }
    resolved.push_str(rest);

    Ok(resolved)
}
