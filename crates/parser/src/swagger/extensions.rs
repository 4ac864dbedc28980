//! Typed `x-terraform-*` vendor extensions
//!
//! Extensions are decoded once per schema, operation, response and document
//! into the structs below. A recognised extension carrying a value of the
//! wrong JSON type is an error; unknown extensions are ignored.

use super::types::Extensions;
use indexmap::IndexMap;
use openapi_resource_analyzer_common::{
    AnalyzerError, Result, EXT_COMPUTED, EXT_EXCLUDE_RESOURCE, EXT_ID,
};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

pub const EXT_FIELD_NAME: &str = "x-terraform-field-name";
pub const EXT_FORCE_NEW: &str = "x-terraform-force-new";
pub const EXT_SENSITIVE: &str = "x-terraform-sensitive";
pub const EXT_IMMUTABLE: &str = "x-terraform-immutable";
pub const EXT_FIELD_STATUS: &str = "x-terraform-field-status";
pub const EXT_IGNORE_ORDER: &str = "x-terraform-ignore-order";
pub const EXT_RESOURCE_NAME: &str = "x-terraform-resource-name";
pub const EXT_RESOURCE_HOST: &str = "x-terraform-resource-host";
pub const EXT_RESOURCE_TIMEOUT: &str = "x-terraform-resource-timeout";
pub const EXT_RESOURCE_REGIONS_PREFIX: &str = "x-terraform-resource-regions-";
pub const EXT_POLL_ENABLED: &str = "x-terraform-resource-poll-enabled";
pub const EXT_POLL_COMPLETED_STATUSES: &str = "x-terraform-resource-poll-completed-statuses";
pub const EXT_POLL_PENDING_STATUSES: &str = "x-terraform-resource-poll-pending-statuses";

/// Extensions recognised on a schema property
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyExtensions {
    pub field_name: Option<String>,
    pub force_new: bool,
    pub sensitive: bool,
    pub id: bool,
    pub immutable: bool,
    pub field_status: bool,
    pub computed: bool,
    pub ignore_order: bool,
}

impl PropertyExtensions {
    pub fn parse(extensions: &Extensions) -> Result<Self> {
        Ok(Self {
            field_name: string_extension(extensions, EXT_FIELD_NAME)?,
            force_new: bool_extension(extensions, EXT_FORCE_NEW)?,
            sensitive: bool_extension(extensions, EXT_SENSITIVE)?,
            id: bool_extension(extensions, EXT_ID)?,
            immutable: bool_extension(extensions, EXT_IMMUTABLE)?,
            field_status: bool_extension(extensions, EXT_FIELD_STATUS)?,
            computed: bool_extension(extensions, EXT_COMPUTED)?,
            ignore_order: bool_extension(extensions, EXT_IGNORE_ORDER)?,
        })
    }
}

/// Extensions recognised on an operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationExtensions {
    pub exclude_resource: bool,
    pub resource_name: Option<String>,
    pub resource_host: Option<String>,
    pub resource_timeout: Option<Duration>,
}

impl OperationExtensions {
    pub fn parse(extensions: &Extensions) -> Result<Self> {
        let resource_timeout = string_extension(extensions, EXT_RESOURCE_TIMEOUT)?
            .map(|value| parse_duration(&value))
            .transpose()?;

        Ok(Self {
            exclude_resource: bool_extension(extensions, EXT_EXCLUDE_RESOURCE)?,
            resource_name: string_extension(extensions, EXT_RESOURCE_NAME)?,
            resource_host: string_extension(extensions, EXT_RESOURCE_HOST)?,
            resource_timeout,
        })
    }
}

/// Polling extensions recognised on a response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseExtensions {
    /// `None` when the response does not mention polling at all
    pub poll_enabled: Option<bool>,
    pub poll_completed_statuses: Option<Vec<String>>,
    pub poll_pending_statuses: Option<Vec<String>>,
}

impl ResponseExtensions {
    pub fn parse(extensions: &Extensions) -> Result<Self> {
        let poll_enabled = match extensions.get(EXT_POLL_ENABLED) {
            None => None,
            Some(_) => Some(bool_extension(extensions, EXT_POLL_ENABLED)?),
        };

        Ok(Self {
            poll_enabled,
            poll_completed_statuses: string_extension(extensions, EXT_POLL_COMPLETED_STATUSES)?
                .map(|v| parse_status_list(&v)),
            poll_pending_statuses: string_extension(extensions, EXT_POLL_PENDING_STATUSES)?
                .map(|v| parse_status_list(&v)),
        })
    }
}

/// Document level extensions
///
/// Region lists stay raw here: a malformed list only matters to the
/// resources whose host uses that keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootExtensions {
    /// Region list values keyed by the keyword after `x-terraform-resource-regions-`
    pub resource_regions: IndexMap<String, Value>,
}

impl RootExtensions {
    pub fn parse(extensions: &Extensions) -> Self {
        let resource_regions = extensions
            .iter()
            .filter_map(|(name, value)| {
                let keyword = name.strip_prefix(EXT_RESOURCE_REGIONS_PREFIX)?;
                Some((keyword.to_string(), value.clone()))
            })
            .collect();
        Self { resource_regions }
    }

    /// Region list value declared for a host keyword
    pub fn regions(&self, keyword: &str) -> Option<&Value> {
        self.resource_regions.get(keyword)
    }
}

fn bool_extension(extensions: &Extensions, name: &str) -> Result<bool> {
    match extensions.get(name) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(enabled)) => Ok(*enabled),
        Some(_) => Err(AnalyzerError::InvalidExtension {
            extension: name.to_string(),
            expected: "boolean",
        }),
    }
}

fn string_extension(extensions: &Extensions, name: &str) -> Result<Option<String>> {
    match extensions.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(AnalyzerError::InvalidExtension {
            extension: name.to_string(),
            expected: "string",
        }),
    }
}

/// Split a comma separated list, dropping spaces and empty entries
pub fn parse_status_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.replace(' ', ""))
        .filter(|s| !s.is_empty())
        .collect()
}

fn duration_regex() -> &'static Regex {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    DURATION.get_or_init(|| Regex::new(r"^\d+(\.\d+)?[smh]$").expect("duration pattern is valid"))
}

/// Parse a timeout such as `30s`, `20.5m` or `1h`
pub fn parse_duration(value: &str) -> Result<Duration> {
    let invalid = || AnalyzerError::InvalidDuration {
        value: value.to_string(),
    };

    if !duration_regex().is_match(value) {
        return Err(invalid());
    }

    let (amount, unit) = value.split_at(value.len() - 1);
    let amount: f64 = amount.parse().map_err(|_| invalid())?;
    let seconds = match unit {
        "s" => amount,
        "m" => amount * 60.0,
        "h" => amount * 3600.0,
        _ => return Err(invalid()),
    };

    Duration::try_from_secs_f64(seconds).map_err(|_| invalid())
}
