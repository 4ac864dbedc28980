//! Resource names and parent chains derived from root paths
//!
//! Names are built from the last literal segment, suffixed `_v<N>` when the
//! segment right before it is a version token:
//!
//! - `/v1/users` → `users_v1`
//! - `/v1/cdns/{id}/v2/firewalls` → `firewalls_v2`, parent `cdns_v1`
//! - `/cdns/{id}/firewalls` → `firewalls`, parent `cdns`
//!
//! Each `{param}` segment before the final segment closes one parent.

use crate::path_classifier::is_param_segment;

/// A parent resource in a sub-resource's nesting chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentResource {
    /// Parent name, version-suffixed (`cdns_v1`)
    pub name: String,
    /// Parent collection path (`/v1/cdns`)
    pub root_path: String,
    /// Parent instance path (`/v1/cdns/{id}`)
    pub instance_path: String,
}

impl ParentResource {
    /// Name of the parent-scope identifier property (`cdns_v1_id`)
    pub fn property_name(&self) -> String {
        format!("{}_id", self.name)
    }
}

/// Whether a segment is a version token: `v` followed by digits
pub fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn join_segments(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

fn versioned(name: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => format!("{}_{}", name, version),
        None => name.to_string(),
    }
}

/// Index of the last literal segment and the version token right before it
fn last_resource_segment<'p>(segments: &[&'p str]) -> Option<(usize, Option<&'p str>)> {
    let index = segments.iter().rposition(|s| !is_param_segment(s))?;
    let version = index
        .checked_sub(1)
        .map(|i| segments[i])
        .filter(|s| is_version_segment(s));
    Some((index, version))
}

/// Own name of the resource behind a root path
///
/// `/v1/cdns/{id}/v2/firewalls` → `firewalls_v2`
pub fn build_resource_name(root_path: &str) -> String {
    let segments = segments(root_path);
    match last_resource_segment(&segments) {
        Some((index, version)) => versioned(segments[index], version),
        None => String::new(),
    }
}

/// Version token right before the resource's own segment, if any
pub fn resource_version(root_path: &str) -> Option<String> {
    let segments = segments(root_path);
    last_resource_segment(&segments).and_then(|(_, version)| version.map(str::to_string))
}

/// Name from an instance path, using the first version token in the path
///
/// `/api/v1/nodes/{name}/proxy/{path}` → `proxy_v1`
pub fn resource_name_from_instance_path(instance_path: &str) -> String {
    let mut segments = segments(instance_path);
    if segments.last().is_some_and(|s| is_param_segment(s)) {
        segments.pop();
    }

    let Some(name) = segments.last().filter(|s| !is_param_segment(s)) else {
        return String::new();
    };
    let version = segments.iter().copied().find(|s| is_version_segment(s));
    versioned(name, version)
}

/// Parent chain of a root path, outermost first
///
/// Empty for top-level resources.
pub fn parent_resources(root_path: &str) -> Vec<ParentResource> {
    let segments = segments(root_path);
    let last = segments.len().saturating_sub(1);

    segments
        .iter()
        .enumerate()
        .filter(|(i, s)| *i > 0 && *i < last && is_param_segment(s))
        .filter_map(|(i, _)| {
            let ancestor = &segments[..i];
            let (index, version) = last_resource_segment(ancestor)?;
            Some(ParentResource {
                name: versioned(ancestor[index], version),
                root_path: join_segments(ancestor),
                instance_path: join_segments(&segments[..=i]),
            })
        })
        .collect()
}

/// Whether two paths are the same template, ignoring parameter names and a
/// trailing slash (`/cdns/{id}` matches `/cdns/{cdn_id}/`)
pub fn same_path_template(a: &str, b: &str) -> bool {
    let (a, b) = (segments(a), segments(b));
    a.len() == b.len()
        && a.iter()
            .zip(&b)
            .all(|(x, y)| x == y || (is_param_segment(x) && is_param_segment(y)))
}

/// Whether the root path is nested under at least one parent instance
pub fn is_sub_resource(root_path: &str) -> bool {
    !parent_resources(root_path).is_empty()
}

/// `<parent>_id` for every parent, outermost first
pub fn parent_property_names(root_path: &str) -> Vec<String> {
    parent_resources(root_path)
        .iter()
        .map(ParentResource::property_name)
        .collect()
}

/// Full descriptor name: parent names, then the own name, joined by `_`
///
/// A name override replaces only the own-name part. It gets the version
/// suffix only when `append_version_on_override` is set.
pub fn descriptor_name(
    root_path: &str,
    name_override: Option<&str>,
    append_version_on_override: bool,
) -> String {
    let own = match name_override {
        Some(name) if append_version_on_override => {
            versioned(name, resource_version(root_path).as_deref())
        }
        Some(name) => name.to_string(),
        None => build_resource_name(root_path),
    };

    parent_resources(root_path)
        .into_iter()
        .map(|parent| parent.name)
        .chain(std::iter::once(own))
        .collect::<Vec<_>>()
        .join("_")
}
