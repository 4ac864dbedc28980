//! Multi-region host templates
//!
//! A resource host such as `cdn.${api}.example.com` is parametrised by the
//! keyword `api`; the document root must then declare
//! `x-terraform-resource-regions-api: "rst1, dub1"`.

use super::extensions::{RootExtensions, EXT_RESOURCE_REGIONS_PREFIX};
use openapi_resource_analyzer_common::{AnalyzerError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// A host with a `${keyword}` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionHostTemplate {
    prefix: String,
    keyword: String,
    suffix: String,
}

fn region_host_regex() -> &'static Regex {
    static HOST: OnceLock<Regex> = OnceLock::new();
    HOST.get_or_init(|| {
        Regex::new(r"^(\S+)\$\{([^}\s]+)\}(\S+)$").expect("region host pattern is valid")
    })
}

impl RegionHostTemplate {
    /// Detect a parametrised host; plain hosts yield `None`
    pub fn parse(host: &str) -> Option<Self> {
        let captures = region_host_regex().captures(host)?;
        Some(Self {
            prefix: captures[1].to_string(),
            keyword: captures[2].to_string(),
            suffix: captures[3].to_string(),
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Root extension that must list the regions for this host
    pub fn extension_name(&self) -> String {
        format!("{}{}", EXT_RESOURCE_REGIONS_PREFIX, self.keyword)
    }

    /// Host with the placeholder replaced by a region
    pub fn resolve(&self, region: &str) -> String {
        format!("{}{}{}", self.prefix, region, self.suffix)
    }

    /// Regions declared for this host, in declaration order
    pub fn regions(&self, root: &RootExtensions) -> Result<Vec<String>> {
        let raw = match root.regions(&self.keyword) {
            None | Some(Value::Null) => {
                return Err(AnalyzerError::MissingRegionExtension {
                    extension: self.extension_name(),
                })
            }
            Some(Value::String(raw)) => raw,
            Some(_) => {
                return Err(AnalyzerError::InvalidRegionExtension {
                    extension: self.extension_name(),
                })
            }
        };

        let regions: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .map(str::to_string)
            .collect();

        if regions.is_empty() {
            return Err(AnalyzerError::EmptyRegions {
                extension: self.extension_name(),
            });
        }

        Ok(regions)
    }
}
